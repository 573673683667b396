use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::currency::Currency;
use crate::error::AppResult;
use crate::store::item::{self, AttrValue, Item};
use crate::utils::now_iso;

/// 投资基金。`min_amount`是订阅时冻结的最小投入额。
#[derive(Debug, Clone, PartialEq)]
pub struct BankFund {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub min_amount: Decimal,
    pub currency: Currency,
    pub user_created: String,
    pub user_updated: String,
    pub created_at: String,
    pub updated_at: String,
}

impl BankFund {
    pub fn new(
        name: String,
        category_id: String,
        min_amount: Decimal,
        currency: Option<&str>,
        user_created: &str,
    ) -> Self {
        let min_amount = if min_amount < Decimal::ZERO {
            log::warn!("Negative min_amount for fund `{name}`, clamping to zero");
            Decimal::ZERO
        } else {
            min_amount
        };
        let now = now_iso();

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category_id,
            min_amount,
            currency: Currency::coerce(currency).or_warn("currency"),
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
            "category_id".to_string(),
            AttrValue::S(self.category_id.clone()),
        );
        item.insert("min_amount".to_string(), AttrValue::N(self.min_amount));
        item.insert(
            "currency".to_string(),
            AttrValue::S(self.currency.as_str().to_string()),
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
            category_id: item::get_s(item, "category_id")?,
            min_amount: item::get_n(item, "min_amount")?,
            currency: Currency::coerce(item::opt_s(item, "currency").as_deref())
                .or_warn("currency"),
            user_created: item::get_s(item, "user_created")?,
            user_updated: item::get_s(item, "user_updated")?,
            created_at: item::get_s(item, "created_at")?,
            updated_at: item::get_s(item, "updated_at")?,
        })
    }
}
