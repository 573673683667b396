use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{Currency, FundStatus, Role};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::user::list_users,
        handlers::category::create_category,
        handlers::category::list_categories,
        handlers::category::get_category,
        handlers::category::update_category,
        handlers::bank_fund::create_bank_fund,
        handlers::bank_fund::list_bank_funds,
        handlers::bank_fund::get_bank_fund,
        handlers::bank_fund::update_bank_fund,
        handlers::user_bank_fund::subscribe,
        handlers::user_bank_fund::list_user_bank_funds,
        handlers::user_bank_fund::get_user_bank_fund,
        handlers::user_bank_fund::unsubscribe,
        handlers::audit::list_audit,
        handlers::audit::get_audit,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RegisterResponse,
            LoginResponse,
            SessionUser,
            UserResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryResponse,
            CreateBankFundRequest,
            UpdateBankFundRequest,
            BankFundResponse,
            UserBankFundResponse,
            UserBankFundAuditResponse,
            Role,
            Currency,
            FundStatus,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "users", description = "User listing API"),
        (name = "category", description = "Fund category API"),
        (name = "bank_funds", description = "Bank fund API"),
        (name = "user_bank_funds", description = "Fund subscription API"),
        (name = "user_bank_funds_audit", description = "Subscription audit API"),
    ),
    info(
        title = "Fondos Backend API",
        version = "1.0.0",
        description = "Fund subscription backend REST API documentation",
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
