use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::coerce::Coerced;
use crate::entities::currency::Currency;
use crate::error::AppResult;
use crate::store::item::{self, AttrValue, Item};
use crate::utils::now_iso;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const DEFAULT: Role = Role::User;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(input: &str) -> Option<Role> {
        match input {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn coerce(input: Option<&str>) -> Coerced<Role> {
        match input {
            Some(raw) => match Role::parse(raw) {
                Some(role) => Coerced::Valid(role),
                None => Coerced::Defaulted {
                    given: Some(raw.to_string()),
                    value: Role::DEFAULT,
                },
            },
            None => Coerced::Defaulted {
                given: None,
                value: Role::DEFAULT,
            },
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 用户记录。`id`来自身份提供方的subject，不在本地生成。
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub nit: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub amount: Decimal,
    pub currency: Currency,
    pub verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// USER角色注册时的初始钱包余额；ADMIN从零开始
    const SEED_AMOUNT_USER: i64 = 500_000;

    pub fn new(
        id: String,
        nit: String,
        name: String,
        last_name: String,
        email: String,
        phone: String,
        role: Role,
        currency: Currency,
    ) -> Self {
        let amount = match role {
            Role::User => Decimal::from(Self::SEED_AMOUNT_USER),
            Role::Admin => Decimal::ZERO,
        };
        let now = now_iso();

        Self {
            id,
            nit,
            name,
            last_name,
            email,
            phone,
            role,
            amount,
            currency,
            verified: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S(self.id.clone()));
        item.insert("nit".to_string(), AttrValue::S(self.nit.clone()));
        item.insert("name".to_string(), AttrValue::S(self.name.clone()));
        item.insert("last_name".to_string(), AttrValue::S(self.last_name.clone()));
        item.insert("email".to_string(), AttrValue::S(self.email.clone()));
        item.insert("phone".to_string(), AttrValue::S(self.phone.clone()));
        item.insert("role".to_string(), AttrValue::S(self.role.as_str().to_string()));
        item.insert("amount".to_string(), AttrValue::N(self.amount));
        item.insert(
            "currency".to_string(),
            AttrValue::S(self.currency.as_str().to_string()),
        );
        item.insert("verified".to_string(), AttrValue::Bool(self.verified));
        item.insert("created_at".to_string(), AttrValue::S(self.created_at.clone()));
        item.insert("updated_at".to_string(), AttrValue::S(self.updated_at.clone()));
        item
    }

    /// 从存储条目重建。余额按存储值读取，不重新播种。
    pub fn from_item(item: &Item) -> AppResult<Self> {
        Ok(Self {
            id: item::get_s(item, "id")?,
            nit: item::get_s(item, "nit")?,
            name: item::get_s(item, "name")?,
            last_name: item::get_s(item, "last_name")?,
            email: item::get_s(item, "email")?,
            phone: item::get_s(item, "phone")?,
            role: Role::coerce(item::opt_s(item, "role").as_deref()).or_warn("role"),
            amount: item::get_n(item, "amount")?,
            currency: Currency::coerce(item::opt_s(item, "currency").as_deref())
                .or_warn("currency"),
            verified: item::get_bool(item, "verified").unwrap_or(false),
            created_at: item::get_s(item, "created_at")?,
            updated_at: item::get_s(item, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(role: Role) -> User {
        User::new(
            "sub-1".to_string(),
            "123456789".to_string(),
            "Daniel".to_string(),
            "Ochoa".to_string(),
            "daniel@example.com".to_string(),
            "+573001234567".to_string(),
            role,
            Currency::DEFAULT,
        )
    }

    #[test]
    fn test_user_role_seeds_starting_balance() {
        let user = sample(Role::User);
        assert_eq!(user.amount, Decimal::from(500_000));
        assert!(!user.verified);

        let admin = sample(Role::Admin);
        assert_eq!(admin.amount, Decimal::ZERO);
    }

    #[test]
    fn test_role_coerce() {
        assert_eq!(Role::coerce(Some("ADMIN")), Coerced::Valid(Role::Admin));
        assert!(Role::coerce(Some("ROOT")).was_defaulted());
        assert_eq!(Role::coerce(Some("ROOT")).value(), Role::User);
        assert!(Role::coerce(None).was_defaulted());
    }

    #[test]
    fn test_item_roundtrip() {
        let user = sample(Role::User);
        let item = user.to_item();
        let restored = User::from_item(&item).unwrap();
        assert_eq!(restored, user);
        assert_eq!(restored.to_item(), item);
    }

    #[test]
    fn test_from_item_keeps_stored_amount() {
        let mut item = sample(Role::User).to_item();
        item.insert("amount".to_string(), AttrValue::N(Decimal::from(499_000)));
        let restored = User::from_item(&item).unwrap();
        assert_eq!(restored.amount, Decimal::from(499_000));
    }
}
