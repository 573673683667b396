use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory"或"dynamo"
    pub backend: String,
    pub endpoint: String,
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// 开发模式下缺表自动建表
    #[serde(default)]
    pub bootstrap_tables: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            endpoint: "http://localhost:8000".to_string(),
            region: "us-east-2".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bootstrap_tables: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// "memory"或"cognito"
    pub provider: String,
    /// 留空时按region推导官方端点
    #[serde(default)]
    pub endpoint: String,
    pub region: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            endpoint: String::new(),
            region: "us-east-2".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from_email: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "email-smtp.us-east-1.amazonaws.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@fondos.local".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 有配置文件则解析，缺失时完全依赖环境变量与默认值
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Config {
                server: ServerConfig::default(),
                store: StoreConfig::default(),
                identity: IdentityConfig::default(),
                smtp: SmtpConfig::default(),
            },
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（文件存在时同样生效）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("STORE_BACKEND") {
            config.store.backend = v;
        }
        if let Ok(v) = env::var("STORE_ENDPOINT") {
            config.store.endpoint = v;
        }
        if let Ok(v) = env::var("AWS_REGION") {
            config.store.region = v.clone();
            config.identity.region = v;
        }
        if let Ok(v) = env::var("AWS_ACCESS_KEY_ID") {
            config.store.access_key_id = v;
        }
        if let Ok(v) = env::var("AWS_SECRET_ACCESS_KEY") {
            config.store.secret_access_key = v;
        }
        if let Ok(v) = env::var("STORE_BOOTSTRAP_TABLES")
            && let Ok(b) = v.parse()
        {
            config.store.bootstrap_tables = b;
        }
        if let Ok(v) = env::var("IDENTITY_PROVIDER") {
            config.identity.provider = v;
        }
        if let Ok(v) = env::var("IDENTITY_ENDPOINT") {
            config.identity.endpoint = v;
        }
        if let Ok(v) = env::var("COGNITO_CLIENT_ID") {
            config.identity.client_id = v;
        }
        if let Ok(v) = env::var("COGNITO_CLIENT_SECRET") {
            config.identity.client_secret = v;
        }
        if let Ok(v) = env::var("SMTP_ENABLED")
            && let Ok(b) = v.parse()
        {
            config.smtp.enabled = b;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            config.smtp.host = v;
        }
        if let Ok(v) = env::var("SMTP_PORT")
            && let Ok(p) = v.parse()
        {
            config.smtp.port = p;
        }
        if let Ok(v) = env::var("SMTP_USERNAME") {
            config.smtp.username = v;
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            config.smtp.password = v;
        }
        if let Ok(v) = env::var("SMTP_FROM_EMAIL") {
            config.smtp.from_email = v;
        }

        Ok(config)
    }
}
