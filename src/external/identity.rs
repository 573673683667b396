use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;

/// 身份提供方暴露的错误类别
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    UsernameExists,
    NotAuthorized,
    UserNotConfirmed,
    Provider(String),
}

impl From<IdentityError> for AppError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::UsernameExists => {
                AppError::Conflict("Email already registered".to_string())
            }
            IdentityError::NotAuthorized => {
                AppError::AuthError("Incorrect username or password".to_string())
            }
            IdentityError::UserNotConfirmed => AppError::AuthError("User not verified".to_string()),
            IdentityError::Provider(message) => AppError::ExternalApiError(message),
        }
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// 托管身份提供方。注册、口令校验、令牌签发/刷新/吊销全部委托，
/// 本服务只消费访问令牌换取的属性映射。
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 注册用户，返回提供方分配的subject id
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[(String, String)],
    ) -> IdentityResult<String>;

    async fn initiate_auth(&self, username: &str, password: &str) -> IdentityResult<AuthTokens>;

    /// 用访问令牌换取用户属性映射
    async fn get_user(&self, access_token: &str) -> IdentityResult<HashMap<String, String>>;

    /// 用刷新令牌换取新的访问令牌
    async fn refresh(&self, refresh_token: &str) -> IdentityResult<String>;

    async fn revoke(&self, refresh_token: &str) -> IdentityResult<()>;

    async fn global_sign_out(&self, access_token: &str) -> IdentityResult<()>;
}

pub type DynIdentityProvider = Arc<dyn IdentityProvider>;
