use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::external::identity::{AuthTokens, IdentityError, IdentityProvider, IdentityResult};
use crate::utils::hash_password;
use crate::utils::verify_password;

struct PoolUser {
    sub: String,
    password_hash: String,
    attributes: HashMap<String, String>,
    confirmed: bool,
}

/// 进程内用户池。开发模式与测试用：口令走bcrypt哈希，
/// 令牌为不透明UUID，注册即确认。
#[derive(Default)]
pub struct MemoryProvider {
    users: RwLock<HashMap<String, PoolUser>>,
    access_tokens: RwLock<HashMap<String, String>>,
    refresh_tokens: RwLock<HashMap<String, String>>,
    sign_up_calls: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 测试观察点：到目前为止的注册调用次数
    pub fn sign_up_count(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[(String, String)],
    ) -> IdentityResult<String> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(IdentityError::UsernameExists);
        }

        let sub = Uuid::new_v4().to_string();
        let mut attribute_map: HashMap<String, String> = attributes.iter().cloned().collect();
        attribute_map.insert("sub".to_string(), sub.clone());

        let password_hash =
            hash_password(password).map_err(|e| IdentityError::Provider(e.to_string()))?;

        users.insert(
            username.to_string(),
            PoolUser {
                sub: sub.clone(),
                password_hash,
                attributes: attribute_map,
                confirmed: true,
            },
        );

        Ok(sub)
    }

    async fn initiate_auth(&self, username: &str, password: &str) -> IdentityResult<AuthTokens> {
        let users = self.users.read().await;
        let user = users.get(username).ok_or(IdentityError::NotAuthorized)?;

        if !user.confirmed {
            return Err(IdentityError::UserNotConfirmed);
        }

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        if !valid {
            return Err(IdentityError::NotAuthorized);
        }

        let tokens = AuthTokens {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
        };

        self.access_tokens
            .write()
            .await
            .insert(tokens.access_token.clone(), username.to_string());
        self.refresh_tokens
            .write()
            .await
            .insert(tokens.refresh_token.clone(), username.to_string());

        Ok(tokens)
    }

    async fn get_user(&self, access_token: &str) -> IdentityResult<HashMap<String, String>> {
        let access_tokens = self.access_tokens.read().await;
        let username = access_tokens
            .get(access_token)
            .ok_or(IdentityError::NotAuthorized)?;

        let users = self.users.read().await;
        let user = users.get(username).ok_or(IdentityError::NotAuthorized)?;
        Ok(user.attributes.clone())
    }

    async fn refresh(&self, refresh_token: &str) -> IdentityResult<String> {
        let refresh_tokens = self.refresh_tokens.read().await;
        let username = refresh_tokens
            .get(refresh_token)
            .ok_or(IdentityError::NotAuthorized)?
            .clone();

        let access_token = Uuid::new_v4().to_string();
        self.access_tokens
            .write()
            .await
            .insert(access_token.clone(), username);
        Ok(access_token)
    }

    async fn revoke(&self, refresh_token: &str) -> IdentityResult<()> {
        self.refresh_tokens.write().await.remove(refresh_token);
        Ok(())
    }

    async fn global_sign_out(&self, access_token: &str) -> IdentityResult<()> {
        let username = match self.access_tokens.read().await.get(access_token) {
            Some(username) => username.clone(),
            None => return Err(IdentityError::NotAuthorized),
        };

        self.access_tokens
            .write()
            .await
            .retain(|_, owner| *owner != username);
        self.refresh_tokens
            .write()
            .await
            .retain(|_, owner| *owner != username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes() -> Vec<(String, String)> {
        vec![
            ("email".to_string(), "daniel@example.com".to_string()),
            ("custom:role".to_string(), "USER".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_sign_up_and_auth_roundtrip() {
        let pool = MemoryProvider::new();
        let sub = pool
            .sign_up("daniel@example.com", "Password123", &attributes())
            .await
            .unwrap();

        let tokens = pool
            .initiate_auth("daniel@example.com", "Password123")
            .await
            .unwrap();
        let user = pool.get_user(&tokens.access_token).await.unwrap();

        assert_eq!(user.get("sub"), Some(&sub));
        assert_eq!(user.get("custom:role"), Some(&"USER".to_string()));
        assert_eq!(pool.sign_up_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = MemoryProvider::new();
        pool.sign_up("daniel@example.com", "Password123", &attributes())
            .await
            .unwrap();

        let result = pool
            .sign_up("daniel@example.com", "Password456", &attributes())
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::UsernameExists);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let pool = MemoryProvider::new();
        pool.sign_up("daniel@example.com", "Password123", &attributes())
            .await
            .unwrap();

        let result = pool.initiate_auth("daniel@example.com", "WrongPassword1").await;
        assert_eq!(result.unwrap_err(), IdentityError::NotAuthorized);
    }

    #[tokio::test]
    async fn test_refresh_issues_working_access_token() {
        let pool = MemoryProvider::new();
        pool.sign_up("daniel@example.com", "Password123", &attributes())
            .await
            .unwrap();
        let tokens = pool
            .initiate_auth("daniel@example.com", "Password123")
            .await
            .unwrap();

        let new_access = pool.refresh(&tokens.refresh_token).await.unwrap();
        assert!(pool.get_user(&new_access).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_is_dead() {
        let pool = MemoryProvider::new();
        pool.sign_up("daniel@example.com", "Password123", &attributes())
            .await
            .unwrap();
        let tokens = pool
            .initiate_auth("daniel@example.com", "Password123")
            .await
            .unwrap();

        pool.revoke(&tokens.refresh_token).await.unwrap();
        assert_eq!(
            pool.refresh(&tokens.refresh_token).await.unwrap_err(),
            IdentityError::NotAuthorized
        );
    }
}
