use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

/// 属性值。货币金额一律走`N`（定点十进制），避免浮点漂移。
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    S(String),
    N(Decimal),
    Bool(bool),
}

impl AttrValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<Decimal> {
        match self {
            AttrValue::N(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// 扁平的字符串键属性映射，存储的唯一条目形态
pub type Item = HashMap<String, AttrValue>;

pub fn get_s(item: &Item, field: &str) -> AppResult<String> {
    item.get(field)
        .and_then(AttrValue::as_s)
        .map(str::to_string)
        .ok_or_else(|| AppError::StoreError(format!("missing string attribute `{field}`")))
}

pub fn get_n(item: &Item, field: &str) -> AppResult<Decimal> {
    item.get(field)
        .and_then(AttrValue::as_n)
        .ok_or_else(|| AppError::StoreError(format!("missing numeric attribute `{field}`")))
}

pub fn get_bool(item: &Item, field: &str) -> AppResult<bool> {
    item.get(field)
        .and_then(AttrValue::as_bool)
        .ok_or_else(|| AppError::StoreError(format!("missing boolean attribute `{field}`")))
}

pub fn opt_s(item: &Item, field: &str) -> Option<String> {
    item.get(field).and_then(AttrValue::as_s).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_getters() {
        let mut item = Item::new();
        item.insert("id".to_string(), AttrValue::S("u-1".to_string()));
        item.insert(
            "amount".to_string(),
            AttrValue::N(Decimal::from_str("500000").unwrap()),
        );
        item.insert("verified".to_string(), AttrValue::Bool(false));

        assert_eq!(get_s(&item, "id").unwrap(), "u-1");
        assert_eq!(
            get_n(&item, "amount").unwrap(),
            Decimal::from_str("500000").unwrap()
        );
        assert!(!get_bool(&item, "verified").unwrap());
        assert!(get_s(&item, "missing").is_err());
        assert!(get_n(&item, "id").is_err());
        assert_eq!(opt_s(&item, "missing"), None);
    }
}
