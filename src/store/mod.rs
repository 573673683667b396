pub mod dynamo;
pub mod item;
pub mod memory;
pub mod sigv4;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
pub use dynamo::DynamoStore;
pub use item::{AttrValue, Item};
pub use memory::MemoryStore;

/// 逻辑表名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Categories,
    BankFunds,
    UserBankFunds,
    UserBankFundsAudit,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::Categories,
        Table::BankFunds,
        Table::UserBankFunds,
        Table::UserBankFundsAudit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "Users",
            Table::Categories => "Categories",
            Table::BankFunds => "BankFunds",
            Table::UserBankFunds => "UserBankFunds",
            Table::UserBankFundsAudit => "UserBankFundsAudit",
        }
    }
}

/// 扫描过滤条件，等值匹配或若干等值匹配的OR
#[derive(Debug, Clone)]
pub enum ScanFilter {
    Eq(String, AttrValue),
    AnyEq(Vec<(String, AttrValue)>),
}

impl ScanFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ScanFilter::Eq(field, value) => item.get(field) == Some(value),
            ScanFilter::AnyEq(conditions) => conditions
                .iter()
                .any(|(field, value)| item.get(field) == Some(value)),
        }
    }
}

/// 文档存储的统一入口，按主键`id`读写扁平属性映射。
/// 单条get/put/update是原子的，不提供跨条目事务。
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, table: Table, key: &str) -> AppResult<Option<Item>>;

    async fn put(&self, table: Table, item: Item) -> AppResult<()>;

    /// 按字段赋值更新并返回更新后的完整条目
    async fn update(
        &self,
        table: Table,
        key: &str,
        assignments: Vec<(String, AttrValue)>,
    ) -> AppResult<Item>;

    async fn scan(&self, table: Table, filter: Option<ScanFilter>) -> AppResult<Vec<Item>>;
}

pub type DynRecordStore = Arc<dyn RecordStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_filter_eq() {
        let mut item = Item::new();
        item.insert("user_id".to_string(), AttrValue::S("u-1".to_string()));

        let filter = ScanFilter::Eq("user_id".to_string(), AttrValue::S("u-1".to_string()));
        assert!(filter.matches(&item));

        let miss = ScanFilter::Eq("user_id".to_string(), AttrValue::S("u-2".to_string()));
        assert!(!miss.matches(&item));
    }

    #[test]
    fn test_scan_filter_any_eq() {
        let mut item = Item::new();
        item.insert("nit".to_string(), AttrValue::S("123456789".to_string()));
        item.insert(
            "email".to_string(),
            AttrValue::S("daniel@example.com".to_string()),
        );

        let filter = ScanFilter::AnyEq(vec![
            ("nit".to_string(), AttrValue::S("000".to_string())),
            (
                "email".to_string(),
                AttrValue::S("daniel@example.com".to_string()),
            ),
        ]);
        assert!(filter.matches(&item));

        let miss = ScanFilter::AnyEq(vec![
            ("nit".to_string(), AttrValue::S("000".to_string())),
            ("email".to_string(), AttrValue::S("other@example.com".to_string())),
        ]);
        assert!(!miss.matches(&item));
    }
}
