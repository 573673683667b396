use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::models::*;
use crate::services::AuthService;

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn refresh_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("X-Refresh-Token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "注册成功", body = RegisterResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "NIT或邮箱已注册")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，令牌在响应头下发", body = LoginResponse),
        (status = 401, description = "认证失败"),
        (status = 404, description = "邮箱未注册")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(outcome) => Ok(HttpResponse::Ok()
            .append_header(("Authorization", format!("Bearer {}", outcome.access_token)))
            .append_header(("X-Refresh-Token", outcome.refresh_token.clone()))
            .json(json!({
                "success": true,
                "data": {
                    "id": outcome.id,
                    "role": outcome.role
                }
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登出成功"),
        (status = 401, description = "缺少令牌")
    )
)]
pub async fn logout(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let access = match bearer_token(&req) {
        Some(token) => token,
        None => {
            return Ok(
                AppError::AuthError("Missing access token".to_string()).error_response()
            );
        }
    };
    let refresh = match refresh_token(&req) {
        Some(token) => token,
        None => {
            return Ok(
                AppError::AuthError("Missing refresh token".to_string()).error_response()
            );
        }
    };

    match auth_service.logout(&access, &refresh).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {}
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    );
}
