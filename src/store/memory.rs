use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::store::item::{AttrValue, Item};
use crate::store::{RecordStore, ScanFilter, Table};

/// 进程内存储后端。开发模式与测试用，语义对齐托管文档存储：
/// 单条读写原子，update缺失键时按主键补建（upsert）。
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, HashMap<String, Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, table: Table, key: &str) -> AppResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table.name())
            .and_then(|rows| rows.get(key))
            .cloned())
    }

    async fn put(&self, table: Table, item: Item) -> AppResult<()> {
        let key = item
            .get("id")
            .and_then(AttrValue::as_s)
            .map(str::to_string)
            .ok_or_else(|| AppError::StoreError("item has no `id` attribute".to_string()))?;

        let mut tables = self.tables.write().await;
        tables.entry(table.name()).or_default().insert(key, item);
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignments: Vec<(String, AttrValue)>,
    ) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.name()).or_default();
        let row = rows.entry(key.to_string()).or_insert_with(|| {
            let mut fresh = Item::new();
            fresh.insert("id".to_string(), AttrValue::S(key.to_string()));
            fresh
        });

        for (field, value) in assignments {
            row.insert(field, value);
        }

        Ok(row.clone())
    }

    async fn scan(&self, table: Table, filter: Option<ScanFilter>) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        let rows = match tables.get(table.name()) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .values()
            .filter(|item| filter.as_ref().map(|f| f.matches(item)).unwrap_or(true))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(id: &str, user_id: &str) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S(id.to_string()));
        item.insert("user_id".to_string(), AttrValue::S(user_id.to_string()));
        item.insert("amount".to_string(), AttrValue::N(Decimal::from(1000)));
        item
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .put(Table::UserBankFunds, item("r-1", "u-1"))
            .await
            .unwrap();

        let got = store.get(Table::UserBankFunds, "r-1").await.unwrap().unwrap();
        assert_eq!(got.get("user_id"), Some(&AttrValue::S("u-1".to_string())));
        assert!(store.get(Table::UserBankFunds, "r-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_without_id_is_rejected() {
        let store = MemoryStore::new();
        let mut bad = Item::new();
        bad.insert("name".to_string(), AttrValue::S("x".to_string()));
        assert!(store.put(Table::Categories, bad).await.is_err());
    }

    #[tokio::test]
    async fn test_update_returns_new_item() {
        let store = MemoryStore::new();
        store
            .put(Table::UserBankFunds, item("r-1", "u-1"))
            .await
            .unwrap();

        let updated = store
            .update(
                Table::UserBankFunds,
                "r-1",
                vec![
                    ("status".to_string(), AttrValue::S("CLOSED".to_string())),
                    ("amount".to_string(), AttrValue::N(Decimal::ZERO)),
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.get("status"), Some(&AttrValue::S("CLOSED".to_string())));
        assert_eq!(updated.get("amount"), Some(&AttrValue::N(Decimal::ZERO)));
        assert_eq!(updated.get("user_id"), Some(&AttrValue::S("u-1".to_string())));
    }

    #[tokio::test]
    async fn test_scan_with_filter() {
        let store = MemoryStore::new();
        store
            .put(Table::UserBankFunds, item("r-1", "u-1"))
            .await
            .unwrap();
        store
            .put(Table::UserBankFunds, item("r-2", "u-2"))
            .await
            .unwrap();

        let all = store.scan(Table::UserBankFunds, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = store
            .scan(
                Table::UserBankFunds,
                Some(ScanFilter::Eq(
                    "user_id".to_string(),
                    AttrValue::S("u-1".to_string()),
                )),
            )
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let empty = store.scan(Table::Categories, None).await.unwrap();
        assert!(empty.is_empty());
    }
}
