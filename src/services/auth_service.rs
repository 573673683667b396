use crate::entities::{Currency, Role, User};
use crate::error::{AppError, AppResult};
use crate::external::{DynIdentityProvider, IdentityError, IdentityProvider};
use crate::models::{LoginOutcome, LoginRequest, RegisterRequest, RegisterResponse, SessionUser};
use crate::store::item::AttrValue;
use crate::store::{DynRecordStore, RecordStore, ScanFilter, Table};
use crate::utils::{validate_email, validate_nit, validate_password, validate_phone};

#[derive(Clone)]
pub struct AuthService {
    store: DynRecordStore,
    identity: DynIdentityProvider,
}

impl AuthService {
    pub fn new(store: DynRecordStore, identity: DynIdentityProvider) -> Self {
        Self { store, identity }
    }

    /// 注册。查重必须发生在任何身份提供方调用之前。
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        let nit = request.nit.trim().to_string();
        let name = request.name.trim().to_string();
        let last_name = request.last_name.trim().to_string();
        let email = request.email.trim().to_string();
        let phone = request.phone.trim().to_string();

        validate_nit(&nit)?;
        validate_email(&email)?;
        validate_phone(&phone)?;
        validate_password(&request.password)?;

        let duplicates = self
            .store
            .scan(
                Table::Users,
                Some(ScanFilter::AnyEq(vec![
                    ("nit".to_string(), AttrValue::S(nit.clone())),
                    ("email".to_string(), AttrValue::S(email.clone())),
                ])),
            )
            .await?;
        if !duplicates.is_empty() {
            return Err(AppError::Conflict(
                "NIT or Email already registered".to_string(),
            ));
        }

        let role = Role::coerce(request.role.as_deref()).or_warn("role");
        let attributes = vec![
            ("name".to_string(), name.clone()),
            ("family_name".to_string(), last_name.clone()),
            ("email".to_string(), email.clone()),
            ("phone_number".to_string(), phone.clone()),
            ("custom:role".to_string(), role.as_str().to_string()),
        ];

        let subject = self
            .identity
            .sign_up(&email, &request.password, &attributes)
            .await?;

        // 用户记录的主键取提供方的subject
        let user = User::new(
            subject.clone(),
            nit,
            name,
            last_name,
            email,
            phone,
            role,
            Currency::DEFAULT,
        );
        self.store.put(Table::Users, user.to_item()).await?;

        log::info!("User {subject} registered with role {role}");
        Ok(RegisterResponse { user_id: subject })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginOutcome> {
        let email = request.email.trim().to_string();

        let known = self
            .store
            .scan(
                Table::Users,
                Some(ScanFilter::Eq(
                    "email".to_string(),
                    AttrValue::S(email.clone()),
                )),
            )
            .await?;
        if known.is_empty() {
            return Err(AppError::NotFound("Email not registered".to_string()));
        }

        let tokens = self
            .identity
            .initiate_auth(&email, &request.password)
            .await?;
        let attributes = self.identity.get_user(&tokens.access_token).await?;

        Ok(LoginOutcome {
            id: attributes.get("sub").cloned().unwrap_or_default(),
            role: attributes
                .get("custom:role")
                .cloned()
                .unwrap_or_else(|| Role::DEFAULT.as_str().to_string()),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// 登出：吊销刷新令牌，失败则回退到全局登出
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> AppResult<()> {
        if let Err(e) = self.identity.revoke(refresh_token).await {
            log::warn!("Refresh token revoke failed, falling back to global sign-out: {e:?}");
            self.identity.global_sign_out(access_token).await?;
        }
        Ok(())
    }

    /// 解析会话。访问令牌失效时先用刷新令牌透明续期再重试一次。
    pub async fn resolve_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> AppResult<SessionUser> {
        let attributes = match self.identity.get_user(access_token).await {
            Ok(attributes) => attributes,
            Err(IdentityError::NotAuthorized) => {
                let refreshed = self.identity.refresh(refresh_token).await.map_err(|e| {
                    AppError::AuthError(format!("Invalid token or expired refresh token: {e:?}"))
                })?;
                self.identity.get_user(&refreshed).await?
            }
            Err(e) => return Err(e.into()),
        };

        Ok(SessionUser {
            user_id: attributes.get("sub").cloned().unwrap_or_default(),
            role: attributes.get("custom:role").cloned().unwrap_or_default(),
        })
    }
}
