use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{BankFund, Currency};
use crate::models::category::CategoryResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBankFundRequest {
    #[schema(example = "FPV_BTG_PACTUAL_RECAUDADORA")]
    pub name: String,
    pub category_id: String,
    #[schema(value_type = String, example = "75000")]
    pub min_amount: Decimal,
    #[schema(example = "COP")]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateBankFundRequest {
    pub name: Option<String>,
    pub category_id: Option<String>,
    #[schema(value_type = Option<String>, example = "125000")]
    pub min_amount: Option<Decimal>,
    #[schema(example = "USD")]
    pub currency: Option<String>,
}

/// 基金响应；读取时把`category_id`关联成完整分类
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BankFundResponse {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    #[schema(value_type = String, example = "75000")]
    pub min_amount: Decimal,
    pub currency: Currency,
    pub user_created: String,
    pub user_updated: String,
    pub created_at: String,
    pub updated_at: String,
}

impl BankFundResponse {
    pub fn new(fund: BankFund, category: Option<CategoryResponse>) -> Self {
        Self {
            id: fund.id,
            name: fund.name,
            category_id: fund.category_id,
            category,
            min_amount: fund.min_amount,
            currency: fund.currency,
            user_created: fund.user_created,
            user_updated: fund.user_updated,
            created_at: fund.created_at,
            updated_at: fund.updated_at,
        }
    }
}

impl From<BankFund> for BankFundResponse {
    fn from(fund: BankFund) -> Self {
        Self::new(fund, None)
    }
}
