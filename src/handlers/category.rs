use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::admin_session;
use crate::models::*;
use crate::services::CategoryService;

#[utoipa::path(
    post,
    path = "/category",
    tag = "category",
    request_body = CreateCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "分类创建成功", body = CategoryResponse),
        (status = 401, description = "需要管理员会话"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_category(
    category_service: web::Data<CategoryService>,
    req: HttpRequest,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    let session = match admin_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match category_service
        .create(&session.user_id, request.into_inner())
        .await
    {
        Ok(category) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": CategoryResponse::from(category)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/category",
    tag = "category",
    responses(
        (status = 200, description = "获取分类列表成功")
    )
)]
pub async fn list_categories(
    category_service: web::Data<CategoryService>,
) -> Result<HttpResponse> {
    match category_service.list().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": categories
                .into_iter()
                .map(CategoryResponse::from)
                .collect::<Vec<_>>()
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/category/{id}",
    tag = "category",
    params(
        ("id" = String, Path, description = "分类ID")
    ),
    responses(
        (status = 200, description = "获取分类成功", body = CategoryResponse),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn get_category(
    category_service: web::Data<CategoryService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match category_service.get(&path.into_inner()).await {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CategoryResponse::from(category)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/category/{id}",
    tag = "category",
    request_body = UpdateCategoryRequest,
    params(
        ("id" = String, Path, description = "分类ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "分类更新成功", body = CategoryResponse),
        (status = 401, description = "需要管理员会话"),
        (status = 404, description = "分类不存在"),
        (status = 400, description = "没有可更新的字段")
    )
)]
pub async fn update_category(
    category_service: web::Data<CategoryService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse> {
    let session = match admin_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match category_service
        .update(&session.user_id, &path.into_inner(), request.into_inner())
        .await
    {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CategoryResponse::from(category)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn category_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/category")
            .route("", web::post().to(create_category))
            .route("", web::get().to(list_categories))
            .route("/{id}", web::get().to(get_category))
            .route("/{id}", web::put().to(update_category)),
    );
}
