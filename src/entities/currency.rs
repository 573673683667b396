use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::coerce::Coerced;

/// 支持的货币。无效或缺失的输入回退到COP。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cop,
    Brl,
}

impl Currency {
    pub const DEFAULT: Currency = Currency::Cop;

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cop => "COP",
            Currency::Brl => "BRL",
        }
    }

    pub fn parse(input: &str) -> Option<Currency> {
        match input {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            "JPY" => Some(Currency::Jpy),
            "COP" => Some(Currency::Cop),
            "BRL" => Some(Currency::Brl),
            _ => None,
        }
    }

    pub fn coerce(input: Option<&str>) -> Coerced<Currency> {
        match input {
            Some(raw) => match Currency::parse(raw) {
                Some(currency) => Coerced::Valid(currency),
                None => Coerced::Defaulted {
                    given: Some(raw.to_string()),
                    value: Currency::DEFAULT,
                },
            },
            None => Coerced::Defaulted {
                given: None,
                value: Currency::DEFAULT,
            },
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for code in ["USD", "EUR", "GBP", "JPY", "COP", "BRL"] {
            assert_eq!(Currency::parse(code).unwrap().as_str(), code);
        }
        assert!(Currency::parse("XYZ").is_none());
    }

    #[test]
    fn test_coerce_falls_back_to_cop() {
        assert_eq!(Currency::coerce(Some("USD")), Coerced::Valid(Currency::Usd));
        assert!(Currency::coerce(Some("XYZ")).was_defaulted());
        assert_eq!(Currency::coerce(Some("XYZ")).value(), Currency::Cop);
        assert!(Currency::coerce(None).was_defaulted());
    }
}
