use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::currency::Currency;
use crate::entities::user_bank_fund::{FundStatus, UserBankFund};
use crate::error::AppResult;
use crate::store::item::{self, AttrValue, Item};
use crate::utils::now_iso;

/// 订阅状态迁移的不可变快照。普通值类型，字段从父记录复制，
/// 仅通过`parent_id`指回订阅，写入后不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct UserBankFundAudit {
    pub id: String,
    pub parent_id: String,
    pub user_id: String,
    pub bank_fund_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: FundStatus,
    pub created_at: String,
}

impl UserBankFundAudit {
    /// 固化父记录当前状态为一条审计行
    pub fn snapshot(parent: &UserBankFund) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: parent.id.clone(),
            user_id: parent.user_id.clone(),
            bank_fund_id: parent.bank_fund_id.clone(),
            amount: parent.amount,
            currency: parent.currency,
            status: parent.status,
            created_at: now_iso(),
        }
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S(self.id.clone()));
        item.insert("parent_id".to_string(), AttrValue::S(self.parent_id.clone()));
        item.insert("user_id".to_string(), AttrValue::S(self.user_id.clone()));
        item.insert(
            "bank_fund_id".to_string(),
            AttrValue::S(self.bank_fund_id.clone()),
        );
        item.insert("amount".to_string(), AttrValue::N(self.amount));
        item.insert(
            "currency".to_string(),
            AttrValue::S(self.currency.as_str().to_string()),
        );
        item.insert(
            "status".to_string(),
            AttrValue::S(self.status.as_str().to_string()),
        );
        item.insert("created_at".to_string(), AttrValue::S(self.created_at.clone()));
        item
    }

    pub fn from_item(item: &Item) -> AppResult<Self> {
        Ok(Self {
            id: item::get_s(item, "id")?,
            parent_id: item::get_s(item, "parent_id")?,
            user_id: item::get_s(item, "user_id")?,
            bank_fund_id: item::get_s(item, "bank_fund_id")?,
            amount: item::get_n(item, "amount")?,
            currency: Currency::coerce(item::opt_s(item, "currency").as_deref())
                .or_warn("currency"),
            status: FundStatus::coerce(item::opt_s(item, "status").as_deref()).or_warn("status"),
            created_at: item::get_s(item, "created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_parent_fields() {
        let parent = UserBankFund::new(
            "u-1".to_string(),
            "f-1".to_string(),
            Decimal::from(1000),
            Currency::Cop,
        );
        let audit = UserBankFundAudit::snapshot(&parent);

        assert_eq!(audit.parent_id, parent.id);
        assert_eq!(audit.user_id, parent.user_id);
        assert_eq!(audit.amount, parent.amount);
        assert_eq!(audit.status, FundStatus::Open);
        assert_ne!(audit.id, parent.id);
    }

    #[test]
    fn test_item_roundtrip() {
        let parent = UserBankFund::new(
            "u-1".to_string(),
            "f-1".to_string(),
            Decimal::from(1000),
            Currency::Cop,
        );
        let audit = UserBankFundAudit::snapshot(&parent);
        let item = audit.to_item();
        let restored = UserBankFundAudit::from_item(&item).unwrap();
        assert_eq!(restored, audit);
        assert_eq!(restored.to_item(), item);
    }
}
