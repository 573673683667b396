use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::coerce::Coerced;
use crate::entities::currency::Currency;
use crate::error::AppResult;
use crate::store::item::{self, AttrValue, Item};
use crate::utils::now_iso;

/// 订阅状态机：OPEN起始，唯一迁移OPEN→CLOSED，关闭后不再重开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundStatus {
    Open,
    Closed,
}

impl FundStatus {
    pub const DEFAULT: FundStatus = FundStatus::Open;

    pub fn as_str(&self) -> &'static str {
        match self {
            FundStatus::Open => "OPEN",
            FundStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(input: &str) -> Option<FundStatus> {
        match input {
            "OPEN" => Some(FundStatus::Open),
            "CLOSED" => Some(FundStatus::Closed),
            _ => None,
        }
    }

    pub fn coerce(input: Option<&str>) -> Coerced<FundStatus> {
        match input {
            Some(raw) => match FundStatus::parse(raw) {
                Some(status) => Coerced::Valid(status),
                None => Coerced::Defaulted {
                    given: Some(raw.to_string()),
                    value: FundStatus::DEFAULT,
                },
            },
            None => Coerced::Defaulted {
                given: None,
                value: FundStatus::DEFAULT,
            },
        }
    }
}

impl std::fmt::Display for FundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 用户在某基金中的持仓。`amount`是订阅时刻基金门槛的快照。
#[derive(Debug, Clone, PartialEq)]
pub struct UserBankFund {
    pub id: String,
    pub user_id: String,
    pub bank_fund_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: FundStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl UserBankFund {
    pub fn new(
        user_id: String,
        bank_fund_id: String,
        amount: Decimal,
        currency: Currency,
    ) -> Self {
        let amount = if amount < Decimal::ZERO {
            log::warn!("Negative subscription amount, clamping to zero");
            Decimal::ZERO
        } else {
            amount
        };
        let now = now_iso();

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            bank_fund_id,
            amount,
            currency,
            status: FundStatus::Open,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S(self.id.clone()));
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
        item.insert("updated_at".to_string(), AttrValue::S(self.updated_at.clone()));
        item
    }

    pub fn from_item(item: &Item) -> AppResult<Self> {
        Ok(Self {
            id: item::get_s(item, "id")?,
            user_id: item::get_s(item, "user_id")?,
            bank_fund_id: item::get_s(item, "bank_fund_id")?,
            amount: item::get_n(item, "amount")?,
            currency: Currency::coerce(item::opt_s(item, "currency").as_deref())
                .or_warn("currency"),
            status: FundStatus::coerce(item::opt_s(item, "status").as_deref()).or_warn("status"),
            created_at: item::get_s(item, "created_at")?,
            updated_at: item::get_s(item, "updated_at")?,
        })
    }
}
