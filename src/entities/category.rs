use uuid::Uuid;

use crate::error::AppResult;
use crate::store::item::{self, AttrValue, Item};
use crate::utils::now_iso;

/// 基金分类
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub user_created: String,
    pub user_updated: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn new(user_created: &str, name: String, description: Option<String>) -> Self {
        let now = now_iso();

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description: description.unwrap_or_default(),
            user_created: user_created.to_string(),
            user_updated: user_created.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S(self.id.clone()));
        item.insert("name".to_string(), AttrValue::S(self.name.clone()));
        item.insert(
            "description".to_string(),
            AttrValue::S(self.description.clone()),
        );
        item.insert(
            "user_created".to_string(),
            AttrValue::S(self.user_created.clone()),
        );
        item.insert(
            "user_updated".to_string(),
            AttrValue::S(self.user_updated.clone()),
        );
        item.insert("created_at".to_string(), AttrValue::S(self.created_at.clone()));
        item.insert("updated_at".to_string(), AttrValue::S(self.updated_at.clone()));
        item
    }

    pub fn from_item(item: &Item) -> AppResult<Self> {
        Ok(Self {
            id: item::get_s(item, "id")?,
            name: item::get_s(item, "name")?,
            description: item::opt_s(item, "description").unwrap_or_default(),
            user_created: item::get_s(item, "user_created")?,
            user_updated: item::get_s(item, "user_updated")?,
            created_at: item::get_s(item, "created_at")?,
            updated_at: item::get_s(item, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let category = Category::new("admin-1", "Renta Variable".to_string(), None);
        assert_eq!(category.description, "");
        assert_eq!(category.user_updated, "admin-1");
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn test_item_roundtrip() {
        let category = Category::new(
            "admin-1",
            "Renta Fija".to_string(),
            Some("Fondos de inversión a largo plazo".to_string()),
        );
        let item = category.to_item();
        let restored = Category::from_item(&item).unwrap();
        assert_eq!(restored, category);
        assert_eq!(restored.to_item(), item);
    }
}
