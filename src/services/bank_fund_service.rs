use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::entities::{BankFund, Category, Currency};
use crate::error::{AppError, AppResult};
use crate::models::{BankFundResponse, CategoryResponse, CreateBankFundRequest, UpdateBankFundRequest};
use crate::store::item::AttrValue;
use crate::store::{DynRecordStore, RecordStore, Table};
use crate::utils::now_iso;

#[derive(Clone)]
pub struct BankFundService {
    store: DynRecordStore,
}

impl BankFundService {
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    async fn category_exists(&self, category_id: &str) -> AppResult<()> {
        self.store
            .get(Table::Categories, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category does not exist".to_string()))?;
        Ok(())
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateBankFundRequest,
    ) -> AppResult<BankFund> {
        self.category_exists(&request.category_id).await?;

        let fund = BankFund::new(
            request.name.trim().to_string(),
            request.category_id,
            request.min_amount,
            request.currency.as_deref(),
            user_id,
        );
        self.store.put(Table::BankFunds, fund.to_item()).await?;

        log::info!("Bank fund {} created by {user_id}", fund.id);
        Ok(fund)
    }

    /// 全部基金，创建时间倒序，分类id关联成完整分类
    pub async fn list(&self) -> AppResult<Vec<BankFundResponse>> {
        let items = self.store.scan(Table::BankFunds, None).await?;

        let mut funds = items
            .iter()
            .map(BankFund::from_item)
            .collect::<AppResult<Vec<_>>>()?;
        funds.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let categories = self.resolve_categories(&funds).await?;
        Ok(funds
            .into_iter()
            .map(|fund| {
                let category = categories.get(&fund.category_id).cloned();
                BankFundResponse::new(fund, category)
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<BankFundResponse> {
        let item = self
            .store
            .get(Table::BankFunds, id)
            .await?
            .ok_or_else(|| AppError::NotFound("BankFund not found".to_string()))?;
        let fund = BankFund::from_item(&item)?;

        let categories = self.resolve_categories(std::slice::from_ref(&fund)).await?;
        let category = categories.get(&fund.category_id).cloned();
        Ok(BankFundResponse::new(fund, category))
    }

    /// 去重后逐个取分类；分类被删除时该基金照常返回，只是没有关联体
    async fn resolve_categories(
        &self,
        funds: &[BankFund],
    ) -> AppResult<HashMap<String, CategoryResponse>> {
        let mut categories: HashMap<String, CategoryResponse> = HashMap::new();
        for fund in funds {
            if categories.contains_key(&fund.category_id) {
                continue;
            }
            if let Some(item) = self.store.get(Table::Categories, &fund.category_id).await? {
                categories.insert(
                    fund.category_id.clone(),
                    CategoryResponse::from(Category::from_item(&item)?),
                );
            }
        }
        Ok(categories)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateBankFundRequest,
    ) -> AppResult<BankFund> {
        let mut assignments: Vec<(String, AttrValue)> = Vec::new();
        if let Some(name) = &request.name {
            assignments.push(("name".to_string(), AttrValue::S(name.trim().to_string())));
        }
        if let Some(category_id) = &request.category_id {
            self.category_exists(category_id).await?;
            assignments.push(("category_id".to_string(), AttrValue::S(category_id.clone())));
        }
        if let Some(min_amount) = request.min_amount {
            let min_amount = if min_amount < Decimal::ZERO {
                log::warn!("Negative min_amount in update, clamping to zero");
                Decimal::ZERO
            } else {
                min_amount
            };
            assignments.push(("min_amount".to_string(), AttrValue::N(min_amount)));
        }
        if let Some(currency) = &request.currency {
            let currency = Currency::coerce(Some(currency)).or_warn("currency");
            assignments.push((
                "currency".to_string(),
                AttrValue::S(currency.as_str().to_string()),
            ));
        }

        if assignments.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".to_string()));
        }

        // 先确认存在，避免update把缺失的键补建出来
        self.store
            .get(Table::BankFunds, id)
            .await?
            .ok_or_else(|| AppError::NotFound("BankFund not found".to_string()))?;

        assignments.push(("user_updated".to_string(), AttrValue::S(user_id.to_string())));
        assignments.push(("updated_at".to_string(), AttrValue::S(now_iso())));

        let updated = self.store.update(Table::BankFunds, id, assignments).await?;
        BankFund::from_item(&updated)
    }
}
