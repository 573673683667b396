use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use serde_json::json;
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use fondos_backend::{
    config::Config,
    external::{CognitoProvider, DynIdentityProvider, MemoryProvider},
    handlers,
    middlewares::{SessionMiddleware, create_cors},
    notify::{DynNotifier, SmtpNotifier},
    services::*,
    store::{DynRecordStore, DynamoStore, MemoryStore},
    swagger::swagger_config,
};

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Fondos backend running" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 文档存储后端
    let store: DynRecordStore = match config.store.backend.as_str() {
        "dynamo" => {
            let dynamo =
                DynamoStore::new(config.store.clone()).expect("Failed to create store client");
            if config.store.bootstrap_tables {
                dynamo
                    .create_tables_if_missing()
                    .await
                    .expect("Failed to bootstrap store tables");
            }
            Arc::new(dynamo)
        }
        _ => {
            log::info!("Using in-memory record store");
            Arc::new(MemoryStore::new())
        }
    };

    // 身份提供方
    let identity: DynIdentityProvider = match config.identity.provider.as_str() {
        "cognito" => Arc::new(CognitoProvider::new(config.identity.clone())),
        _ => {
            log::info!("Using in-memory identity provider");
            Arc::new(MemoryProvider::new())
        }
    };

    // 邮件出口
    let notifier: DynNotifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));

    // 创建服务
    let auth_service = AuthService::new(store.clone(), identity.clone());
    let user_service = UserService::new(store.clone());
    let category_service = CategoryService::new(store.clone());
    let bank_fund_service = BankFundService::new(store.clone());
    let subscription_service = SubscriptionService::new(store.clone(), notifier.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(SessionMiddleware::new(auth_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(category_service.clone()))
            .app_data(web::Data::new(bank_fund_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(swagger_config)
            .route("/", web::get().to(index))
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::category_config)
                    .configure(handlers::bank_fund_config)
                    .configure(handlers::user_bank_fund_config)
                    .configure(handlers::audit_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
