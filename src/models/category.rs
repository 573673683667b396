use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::Category;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Inversiones")]
    pub name: String,
    #[schema(example = "Fondos de inversión a largo plazo")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    #[schema(example = "Inversiones")]
    pub name: Option<String>,
    #[schema(example = "Nueva descripción")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub user_created: String,
    pub user_updated: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            user_created: category.user_created,
            user_updated: category.user_updated,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
