use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Currency, FundStatus, UserBankFund, UserBankFundAudit};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserBankFundResponse {
    pub id: String,
    pub user_id: String,
    pub bank_fund_id: String,
    #[schema(value_type = String, example = "75000")]
    pub amount: Decimal,
    pub currency: Currency,
    pub status: FundStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserBankFund> for UserBankFundResponse {
    fn from(relation: UserBankFund) -> Self {
        Self {
            id: relation.id,
            user_id: relation.user_id,
            bank_fund_id: relation.bank_fund_id,
            amount: relation.amount,
            currency: relation.currency,
            status: relation.status,
            created_at: relation.created_at,
            updated_at: relation.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserBankFundAuditResponse {
    pub id: String,
    pub parent_id: String,
    pub user_id: String,
    pub bank_fund_id: String,
    #[schema(value_type = String, example = "75000")]
    pub amount: Decimal,
    pub currency: Currency,
    pub status: FundStatus,
    pub created_at: String,
}

impl From<UserBankFundAudit> for UserBankFundAuditResponse {
    fn from(audit: UserBankFundAudit) -> Self {
        Self {
            id: audit.id,
            parent_id: audit.parent_id,
            user_id: audit.user_id,
            bank_fund_id: audit.bank_fund_id,
            amount: audit.amount,
            currency: audit.currency,
            status: audit.status,
            created_at: audit.created_at,
        }
    }
}
