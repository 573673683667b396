use crate::entities::User;
use crate::error::{AppError, AppResult};
use crate::models::{SessionUser, UserResponse};
use crate::store::{DynRecordStore, RecordStore, Table};

#[derive(Clone)]
pub struct UserService {
    store: DynRecordStore,
}

impl UserService {
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    /// ADMIN看到全部用户，其余只看到自己
    pub async fn list(&self, session: &SessionUser) -> AppResult<Vec<UserResponse>> {
        let own_item = self
            .store
            .get(Table::Users, &session.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !session.is_admin() {
            let user = User::from_item(&own_item)?;
            return Ok(vec![UserResponse::from(user)]);
        }

        let items = self.store.scan(Table::Users, None).await?;
        let mut users = items
            .iter()
            .map(User::from_item)
            .collect::<AppResult<Vec<_>>>()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Currency, Role};
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    async fn seed(store: &MemoryStore, id: &str, role: Role) {
        let user = User::new(
            id.to_string(),
            format!("10000000{id}"),
            "Daniel".to_string(),
            "Ochoa".to_string(),
            format!("{id}@example.com"),
            "+573001234567".to_string(),
            role,
            Currency::DEFAULT,
        );
        store.put(Table::Users, user.to_item()).await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_sees_all_users_see_self() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "admin-1", Role::Admin).await;
        seed(&store, "u-1", Role::User).await;
        seed(&store, "u-2", Role::User).await;
        let service = UserService::new(store.clone());

        let admin_view = service
            .list(&SessionUser {
                user_id: "admin-1".to_string(),
                role: "ADMIN".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(admin_view.len(), 3);

        let user_view = service
            .list(&SessionUser {
                user_id: "u-1".to_string(),
                role: "USER".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user_view.len(), 1);
        assert_eq!(user_view[0].id, "u-1");
    }

    #[tokio::test]
    async fn test_unknown_session_user_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store);

        let result = service
            .list(&SessionUser {
                user_id: "ghost".to_string(),
                role: "USER".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
