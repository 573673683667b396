use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // 生产环境应当收紧允许的域名
            true
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        // 令牌通过响应头下发，前端需要能读到
        .expose_headers(vec!["Authorization", "X-Refresh-Token"])
        .supports_credentials()
        .max_age(3600)
}
