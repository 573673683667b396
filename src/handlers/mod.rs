pub mod audit;
pub mod auth;
pub mod bank_fund;
pub mod category;
pub mod user;
pub mod user_bank_fund;

use actix_web::{HttpMessage, HttpRequest};

use crate::error::AppError;
use crate::models::SessionUser;

pub use audit::audit_config;
pub use auth::auth_config;
pub use bank_fund::bank_fund_config;
pub use category::category_config;
pub use user::user_config;
pub use user_bank_fund::user_bank_fund_config;

/// 会话中间件塞进请求扩展的身份
pub(crate) fn session_from_request(req: &HttpRequest) -> Result<SessionUser, AppError> {
    req.extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing session".to_string()))
}

pub(crate) fn admin_session(req: &HttpRequest) -> Result<SessionUser, AppError> {
    let session = session_from_request(req)?;
    if !session.is_admin() {
        return Err(AppError::AuthError("Access denied".to_string()));
    }
    Ok(session)
}
