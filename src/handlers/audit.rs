use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::session_from_request;
use crate::models::*;
use crate::services::SubscriptionService;

#[utoipa::path(
    get,
    path = "/user-bank-funds-audit",
    tag = "user_bank_funds_audit",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取审计记录成功")
    )
)]
pub async fn list_audit(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .list_audit_for_user(&session.user_id)
        .await
    {
        Ok(audits) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": audits
                .into_iter()
                .map(UserBankFundAuditResponse::from)
                .collect::<Vec<_>>()
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-bank-funds-audit/{id}",
    tag = "user_bank_funds_audit",
    params(
        ("id" = String, Path, description = "审计记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取审计记录成功", body = UserBankFundAuditResponse),
        (status = 404, description = "审计记录不存在")
    )
)]
pub async fn get_audit(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .get_audit(&session.user_id, &path.into_inner())
        .await
    {
        Ok(audit) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": UserBankFundAuditResponse::from(audit)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn audit_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user-bank-funds-audit")
            .route("", web::get().to(list_audit))
            .route("/{id}", web::get().to(get_audit)),
    );
}
