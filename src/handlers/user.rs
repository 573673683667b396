use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::session_from_request;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "ADMIN返回全部用户，其余只返回自己"),
        (status = 401, description = "未授权"),
        (status = 404, description = "会话用户不存在")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let session = match session_from_request(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.list(&session).await {
        Ok(users) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": users
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/users").route("", web::get().to(list_users)));
}
