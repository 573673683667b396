use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::IdentityConfig;
use crate::external::identity::{AuthTokens, IdentityError, IdentityProvider, IdentityResult};
use crate::utils::secret_hash;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// 托管用户池的HTTP客户端。这组客户端API不要求请求签名，
/// 身份由ClientId加SECRET_HASH证明。
pub struct CognitoProvider {
    client: Client,
    config: IdentityConfig,
    endpoint: String,
}

impl CognitoProvider {
    pub fn new(config: IdentityConfig) -> Self {
        let endpoint = if config.endpoint.is_empty() {
            format!("https://cognito-idp.{}.amazonaws.com/", config.region)
        } else {
            config.endpoint.clone()
        };

        Self {
            client: Client::new(),
            config,
            endpoint,
        }
    }

    fn secret_hash_for(&self, username: &str) -> String {
        secret_hash(username, &self.config.client_id, &self.config.client_secret)
    }

    async fn call(&self, operation: &str, body: Value) -> IdentityResult<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", format!("{TARGET_PREFIX}.{operation}"))
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| IdentityError::Provider(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("{operation} bad response: {e}")))?;

        if status.is_success() {
            return Ok(value);
        }

        let kind = value
            .get("__type")
            .and_then(Value::as_str)
            .unwrap_or("UnknownException");

        if kind.contains("UsernameExistsException") {
            Err(IdentityError::UsernameExists)
        } else if kind.contains("NotAuthorizedException") {
            Err(IdentityError::NotAuthorized)
        } else if kind.contains("UserNotConfirmedException") {
            Err(IdentityError::UserNotConfirmed)
        } else {
            let message = value
                .get("message")
                .or_else(|| value.get("Message"))
                .and_then(Value::as_str)
                .unwrap_or("");
            Err(IdentityError::Provider(format!(
                "{operation} failed: {kind} {message}"
            )))
        }
    }

    fn result_token(value: &Value, field: &str) -> IdentityResult<String> {
        value
            .get("AuthenticationResult")
            .and_then(|result| result.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                IdentityError::Provider(format!("authentication result has no {field}"))
            })
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[(String, String)],
    ) -> IdentityResult<String> {
        let user_attributes: Vec<Value> = attributes
            .iter()
            .map(|(name, value)| json!({ "Name": name, "Value": value }))
            .collect();

        let response = self
            .call(
                "SignUp",
                json!({
                    "ClientId": self.config.client_id,
                    "Username": username,
                    "Password": password,
                    "SecretHash": self.secret_hash_for(username),
                    "UserAttributes": user_attributes,
                }),
            )
            .await?;

        response
            .get("UserSub")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| IdentityError::Provider("SignUp returned no UserSub".to_string()))
    }

    async fn initiate_auth(&self, username: &str, password: &str) -> IdentityResult<AuthTokens> {
        let response = self
            .call(
                "InitiateAuth",
                json!({
                    "ClientId": self.config.client_id,
                    "AuthFlow": "USER_PASSWORD_AUTH",
                    "AuthParameters": {
                        "USERNAME": username,
                        "PASSWORD": password,
                        "SECRET_HASH": self.secret_hash_for(username),
                    },
                }),
            )
            .await?;

        Ok(AuthTokens {
            access_token: Self::result_token(&response, "AccessToken")?,
            refresh_token: Self::result_token(&response, "RefreshToken")?,
        })
    }

    async fn get_user(&self, access_token: &str) -> IdentityResult<HashMap<String, String>> {
        let response = self
            .call("GetUser", json!({ "AccessToken": access_token }))
            .await?;

        let mut attributes = HashMap::new();
        if let Some(raw) = response.get("UserAttributes").and_then(Value::as_array) {
            for attribute in raw {
                if let (Some(name), Some(value)) = (
                    attribute.get("Name").and_then(Value::as_str),
                    attribute.get("Value").and_then(Value::as_str),
                ) {
                    attributes.insert(name.to_string(), value.to_string());
                }
            }
        }
        Ok(attributes)
    }

    async fn refresh(&self, refresh_token: &str) -> IdentityResult<String> {
        let response = self
            .call(
                "InitiateAuth",
                json!({
                    "ClientId": self.config.client_id,
                    "AuthFlow": "REFRESH_TOKEN_AUTH",
                    "AuthParameters": { "REFRESH_TOKEN": refresh_token },
                }),
            )
            .await?;

        Self::result_token(&response, "AccessToken")
    }

    async fn revoke(&self, refresh_token: &str) -> IdentityResult<()> {
        self.call(
            "RevokeToken",
            json!({
                "Token": refresh_token,
                "ClientId": self.config.client_id,
                "ClientSecret": self.config.client_secret,
            }),
        )
        .await?;
        Ok(())
    }

    async fn global_sign_out(&self, access_token: &str) -> IdentityResult<()> {
        self.call("GlobalSignOut", json!({ "AccessToken": access_token }))
            .await?;
        Ok(())
    }
}
