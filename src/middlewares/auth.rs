use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;

use crate::error::AppError;
use crate::services::AuthService;

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // 仅GET公开的前缀（目录类读取不要求会话）
    public_get_prefixes: Vec<&'static str>,
    // 公开前缀下仍需认证的路径
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/", "/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/auth/"],
            public_get_prefixes: vec!["/api/category", "/api/bank-funds"],
            excluded_paths: vec!["/api/auth/logout"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        method == Method::GET
            && self
                .public_get_prefixes
                .iter()
                .any(|&prefix| path.starts_with(prefix))
    }
}

/// 会话中间件：访问令牌+刷新令牌换取会话身份，
/// 访问令牌过期时先透明续期再放行
pub struct SessionMiddleware {
    auth_service: AuthService,
}

impl SessionMiddleware {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            auth_service: self.auth_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    auth_service: AuthService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有CORS预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let access_token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);
        let refresh_token = req
            .headers()
            .get("X-Refresh-Token")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let service = Rc::clone(&self.service);
        let auth_service = self.auth_service.clone();

        Box::pin(async move {
            let access_token = access_token
                .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;
            let refresh_token = refresh_token
                .ok_or_else(|| AppError::AuthError("Missing refresh token".to_string()))?;

            let session = auth_service
                .resolve_session(&access_token, &refresh_token)
                .await?;

            req.extensions_mut().insert(session);
            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();

        assert!(paths.is_public(&Method::POST, "/api/auth/register"));
        assert!(paths.is_public(&Method::POST, "/api/auth/login"));
        assert!(!paths.is_public(&Method::POST, "/api/auth/logout"));

        // 目录类读取公开，写入需要会话
        assert!(paths.is_public(&Method::GET, "/api/category"));
        assert!(paths.is_public(&Method::GET, "/api/bank-funds/f-1"));
        assert!(!paths.is_public(&Method::POST, "/api/category"));
        assert!(!paths.is_public(&Method::PUT, "/api/bank-funds/f-1"));

        // 订阅与审计永远需要会话
        assert!(!paths.is_public(&Method::GET, "/api/user-bank-funds"));
        assert!(!paths.is_public(&Method::GET, "/api/user-bank-funds-audit"));
        assert!(!paths.is_public(&Method::GET, "/api/users"));

        assert!(paths.is_public(&Method::GET, "/"));
        assert!(paths.is_public(&Method::GET, "/swagger-ui/"));
    }
}
