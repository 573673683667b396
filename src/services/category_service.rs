use crate::entities::Category;
use crate::error::{AppError, AppResult};
use crate::models::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::store::item::AttrValue;
use crate::store::{DynRecordStore, RecordStore, Table};
use crate::utils::now_iso;

#[derive(Clone)]
pub struct CategoryService {
    store: DynRecordStore,
}

impl CategoryService {
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateCategoryRequest,
    ) -> AppResult<Category> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Category name is required".to_string(),
            ));
        }

        let category = Category::new(user_id, request.name.trim().to_string(), request.description);
        self.store
            .put(Table::Categories, category.to_item())
            .await?;

        log::info!("Category {} created by {user_id}", category.id);
        Ok(category)
    }

    /// 全部分类，创建时间倒序
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let items = self.store.scan(Table::Categories, None).await?;

        let mut categories = items
            .iter()
            .map(Category::from_item)
            .collect::<AppResult<Vec<_>>>()?;
        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(categories)
    }

    pub async fn get(&self, id: &str) -> AppResult<Category> {
        let item = self
            .store
            .get(Table::Categories, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
        Category::from_item(&item)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateCategoryRequest,
    ) -> AppResult<Category> {
        let mut assignments: Vec<(String, AttrValue)> = Vec::new();
        if let Some(name) = &request.name {
            assignments.push(("name".to_string(), AttrValue::S(name.trim().to_string())));
        }
        if let Some(description) = &request.description {
            assignments.push((
                "description".to_string(),
                AttrValue::S(description.clone()),
            ));
        }

        if assignments.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".to_string()));
        }

        // 先确认存在，避免update把缺失的键补建出来
        self.get(id).await?;

        assignments.push(("user_updated".to_string(), AttrValue::S(user_id.to_string())));
        assignments.push(("updated_at".to_string(), AttrValue::S(now_iso())));

        let updated = self.store.update(Table::Categories, id, assignments).await?;
        Category::from_item(&updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    fn setup() -> CategoryService {
        CategoryService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup();
        let created = service
            .create(
                "admin-1",
                CreateCategoryRequest {
                    name: "Renta Variable".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.user_updated, "admin-1");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let service = setup();
        let result = service
            .create(
                "admin-1",
                CreateCategoryRequest {
                    name: "  ".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_creation_desc() {
        let service = setup();
        for name in ["Primera", "Segunda", "Tercera"] {
            service
                .create(
                    "admin-1",
                    CreateCategoryRequest {
                        name: name.to_string(),
                        description: None,
                    },
                )
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let categories = service.list().await.unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].name, "Tercera");
        assert_eq!(categories[2].name, "Primera");
    }

    #[tokio::test]
    async fn test_update_paths() {
        let service = setup();
        let created = service
            .create(
                "admin-1",
                CreateCategoryRequest {
                    name: "Renta Fija".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                "admin-2",
                &created.id,
                UpdateCategoryRequest {
                    name: None,
                    description: Some("Fondos conservadores".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Fondos conservadores");
        assert_eq!(updated.user_updated, "admin-2");
        assert_eq!(updated.name, "Renta Fija");

        let nothing = service
            .update(
                "admin-2",
                &created.id,
                UpdateCategoryRequest {
                    name: None,
                    description: None,
                },
            )
            .await;
        assert!(matches!(nothing, Err(AppError::ValidationError(_))));

        let missing = service
            .update(
                "admin-2",
                "ghost",
                UpdateCategoryRequest {
                    name: Some("X".to_string()),
                    description: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
