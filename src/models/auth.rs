use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "123456789")]
    pub nit: String,
    #[schema(example = "Daniel")]
    pub name: String,
    #[schema(example = "Ochoa")]
    pub last_name: String,
    #[schema(example = "daniel@example.com")]
    pub email: String,
    #[schema(example = "+573001234567")]
    pub phone: String,
    #[schema(example = "USER")]
    pub role: Option<String>,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "daniel@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: String,
}

/// 登录响应体。令牌通过`Authorization`/`X-Refresh-Token`响应头下发。
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: String,
    pub role: String,
}

/// 登录成功后的完整结果：响应体加两个令牌
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub id: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// 中间件解析出的会话身份
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub user_id: String,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin_is_case_insensitive() {
        let admin = SessionUser {
            user_id: "u-1".to_string(),
            role: "ADMIN".to_string(),
        };
        let user = SessionUser {
            user_id: "u-2".to_string(),
            role: "USER".to_string(),
        };

        assert!(admin.is_admin());
        assert!(!user.is_admin());
    }
}
