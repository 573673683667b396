use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::session_from_request;
use crate::models::*;
use crate::services::SubscriptionService;

#[utoipa::path(
    post,
    path = "/user-bank-funds/{bank_fund_id}",
    tag = "user_bank_funds",
    params(
        ("bank_fund_id" = String, Path, description = "要订阅的基金ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "订阅成功", body = UserBankFundResponse),
        (status = 400, description = "余额不足"),
        (status = 404, description = "用户或基金不存在")
    )
)]
pub async fn subscribe(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .subscribe(&session.user_id, &path.into_inner())
        .await
    {
        Ok(relation) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": UserBankFundResponse::from(relation)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-bank-funds",
    tag = "user_bank_funds",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订阅列表成功")
    )
)]
pub async fn list_user_bank_funds(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.list_for_user(&session.user_id).await {
        Ok(relations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": relations
                .into_iter()
                .map(UserBankFundResponse::from)
                .collect::<Vec<_>>()
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-bank-funds/{id}",
    tag = "user_bank_funds",
    params(
        ("id" = String, Path, description = "订阅记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订阅成功", body = UserBankFundResponse),
        (status = 404, description = "订阅不存在")
    )
)]
pub async fn get_user_bank_fund(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = session_from_request(&req) {
        return Ok(e.error_response());
    }

    match subscription_service.get(&path.into_inner()).await {
        Ok(relation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": UserBankFundResponse::from(relation)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/user-bank-funds/{user_bank_fund_id}",
    tag = "user_bank_funds",
    params(
        ("user_bank_fund_id" = String, Path, description = "要退订的订阅记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "退订成功", body = UserBankFundResponse),
        (status = 404, description = "用户、订阅或基金不存在"),
        (status = 409, description = "订阅已关闭")
    )
)]
pub async fn unsubscribe(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .unsubscribe(&session.user_id, &path.into_inner())
        .await
    {
        Ok(relation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": UserBankFundResponse::from(relation)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_bank_fund_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user-bank-funds")
            .route("", web::get().to(list_user_bank_funds))
            .route("/{id}", web::get().to(get_user_bank_fund))
            .route("/{bank_fund_id}", web::post().to(subscribe))
            .route("/{user_bank_fund_id}", web::delete().to(unsubscribe)),
    );
}
