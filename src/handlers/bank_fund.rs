use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::admin_session;
use crate::models::*;
use crate::services::BankFundService;

#[utoipa::path(
    post,
    path = "/bank-funds",
    tag = "bank_funds",
    request_body = CreateBankFundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "基金创建成功", body = BankFundResponse),
        (status = 401, description = "需要管理员会话"),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn create_bank_fund(
    bank_fund_service: web::Data<BankFundService>,
    req: HttpRequest,
    request: web::Json<CreateBankFundRequest>,
) -> Result<HttpResponse> {
    let session = match admin_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match bank_fund_service
        .create(&session.user_id, request.into_inner())
        .await
    {
        Ok(fund) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": BankFundResponse::from(fund)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bank-funds",
    tag = "bank_funds",
    responses(
        (status = 200, description = "获取基金列表成功")
    )
)]
pub async fn list_bank_funds(
    bank_fund_service: web::Data<BankFundService>,
) -> Result<HttpResponse> {
    match bank_fund_service.list().await {
        Ok(funds) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": funds
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bank-funds/{id}",
    tag = "bank_funds",
    params(
        ("id" = String, Path, description = "基金ID")
    ),
    responses(
        (status = 200, description = "获取基金成功", body = BankFundResponse),
        (status = 404, description = "基金不存在")
    )
)]
pub async fn get_bank_fund(
    bank_fund_service: web::Data<BankFundService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match bank_fund_service.get(&path.into_inner()).await {
        Ok(fund) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": fund
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/bank-funds/{id}",
    tag = "bank_funds",
    request_body = UpdateBankFundRequest,
    params(
        ("id" = String, Path, description = "基金ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "基金更新成功", body = BankFundResponse),
        (status = 401, description = "需要管理员会话"),
        (status = 404, description = "基金或分类不存在"),
        (status = 400, description = "没有可更新的字段")
    )
)]
pub async fn update_bank_fund(
    bank_fund_service: web::Data<BankFundService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateBankFundRequest>,
) -> Result<HttpResponse> {
    let session = match admin_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match bank_fund_service
        .update(&session.user_id, &path.into_inner(), request.into_inner())
        .await
    {
        Ok(fund) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": BankFundResponse::from(fund)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn bank_fund_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bank-funds")
            .route("", web::post().to(create_bank_fund))
            .route("", web::get().to(list_bank_funds))
            .route("/{id}", web::get().to(get_bank_fund))
            .route("/{id}", web::put().to(update_bank_fund)),
    );
}
