use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Currency, Role, User};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[schema(example = "123456789")]
    pub nit: String,
    #[schema(example = "Daniel")]
    pub name: String,
    #[schema(example = "Ochoa")]
    pub last_name: String,
    #[schema(example = "daniel@example.com")]
    pub email: String,
    #[schema(example = "+573001234567")]
    pub phone: String,
    pub role: Role,
    #[schema(value_type = String, example = "500000")]
    pub amount: Decimal,
    pub currency: Currency,
    pub verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nit: user.nit,
            name: user.name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            amount: user.amount,
            currency: user.currency,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
