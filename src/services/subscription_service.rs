use rust_decimal::Decimal;

use crate::entities::{BankFund, FundStatus, User, UserBankFund, UserBankFundAudit};
use crate::error::{AppError, AppResult};
use crate::notify::{self, DynNotifier, emails};
use crate::store::item::AttrValue;
use crate::store::{DynRecordStore, RecordStore, ScanFilter, Table};
use crate::utils::now_iso;

/// 订阅事务：余额校验、扣/退款、订阅记录与审计追加。
/// 存储只保证单条写入原子，这里用固定的写入顺序加反向补偿
/// 来兜住中途失败。
#[derive(Clone)]
pub struct SubscriptionService {
    store: DynRecordStore,
    notifier: DynNotifier,
}

impl SubscriptionService {
    pub fn new(store: DynRecordStore, notifier: DynNotifier) -> Self {
        Self { store, notifier }
    }

    async fn load_user(&self, user_id: &str) -> AppResult<User> {
        let item = self
            .store
            .get(Table::Users, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        User::from_item(&item)
    }

    async fn load_fund(&self, bank_fund_id: &str) -> AppResult<BankFund> {
        let item = self
            .store
            .get(Table::BankFunds, bank_fund_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bank fund not found".to_string()))?;
        BankFund::from_item(&item)
    }

    /// 写入新的余额并刷新updated_at
    async fn write_balance(&self, user_id: &str, amount: Decimal) -> AppResult<()> {
        self.store
            .update(
                Table::Users,
                user_id,
                vec![
                    ("amount".to_string(), AttrValue::N(amount)),
                    ("updated_at".to_string(), AttrValue::S(now_iso())),
                ],
            )
            .await?;
        Ok(())
    }

    /// 补偿本身失败时的人工对账记录
    fn reconciliation_log(operation: &str, user_id: &str, detail: &str) {
        log::error!("RECONCILIATION required: operation={operation} user_id={user_id} {detail}");
    }

    /// 订阅基金。余额校验和扣款是两次独立的存储调用，
    /// 同一用户并发订阅可能同时通过校验。
    pub async fn subscribe(&self, user_id: &str, bank_fund_id: &str) -> AppResult<UserBankFund> {
        let user = self.load_user(user_id).await?;
        let fund = self.load_fund(bank_fund_id).await?;

        // 余额不足：通知后拒绝，不落任何状态
        if user.amount < fund.min_amount {
            notify::send_best_effort(
                &self.notifier,
                &user.email,
                &emails::insufficient_funds(&user.name, &fund),
            )
            .await;
            return Err(AppError::InsufficientFunds(format!(
                "No balance available to subscribe to fund {}",
                fund.name
            )));
        }

        // 扣款先于订阅记录落盘，崩溃时不会出现未扣款的订阅
        let debited = user.amount - fund.min_amount;
        self.write_balance(&user.id, debited).await?;

        let relation = UserBankFund::new(
            user.id.clone(),
            fund.id.clone(),
            fund.min_amount,
            fund.currency,
        );
        if let Err(e) = self
            .store
            .put(Table::UserBankFunds, relation.to_item())
            .await
        {
            // 反向补偿：退回扣款
            if let Err(comp) = self.write_balance(&user.id, user.amount).await {
                Self::reconciliation_log(
                    "subscribe",
                    &user.id,
                    &format!(
                        "debit of {} not refunded after relation write failure: {comp}",
                        fund.min_amount
                    ),
                );
            }
            return Err(e);
        }

        let audit = UserBankFundAudit::snapshot(&relation);
        if let Err(e) = self
            .store
            .put(Table::UserBankFundsAudit, audit.to_item())
            .await
        {
            // 反向补偿：关闭订阅、退回扣款
            if let Err(comp) = self
                .store
                .update(
                    Table::UserBankFunds,
                    &relation.id,
                    vec![
                        (
                            "status".to_string(),
                            AttrValue::S(FundStatus::Closed.as_str().to_string()),
                        ),
                        ("updated_at".to_string(), AttrValue::S(now_iso())),
                    ],
                )
                .await
            {
                Self::reconciliation_log(
                    "subscribe",
                    &user.id,
                    &format!(
                        "relation {} left open without audit row: {comp}",
                        relation.id
                    ),
                );
            }
            if let Err(comp) = self.write_balance(&user.id, user.amount).await {
                Self::reconciliation_log(
                    "subscribe",
                    &user.id,
                    &format!(
                        "debit of {} not refunded after audit write failure: {comp}",
                        fund.min_amount
                    ),
                );
            }
            return Err(e);
        }

        notify::send_best_effort(
            &self.notifier,
            &user.email,
            &emails::subscription_opened(&user.name, &fund),
        )
        .await;

        log::info!(
            "User {} subscribed to fund {} for {} {}",
            user.id,
            fund.id,
            fund.currency,
            fund.min_amount
        );
        Ok(relation)
    }

    /// 退订。已关闭的订阅直接冲突拒绝，余额绝不二次入账。
    pub async fn unsubscribe(
        &self,
        user_id: &str,
        user_bank_fund_id: &str,
    ) -> AppResult<UserBankFund> {
        let user = self.load_user(user_id).await?;

        let relation_item = self
            .store
            .get(Table::UserBankFunds, user_bank_fund_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User bank fund not found".to_string()))?;
        let relation = UserBankFund::from_item(&relation_item)?;

        let fund = self.load_fund(&relation.bank_fund_id).await?;

        if relation.status == FundStatus::Closed {
            return Err(AppError::Conflict(
                "User bank fund is already closed".to_string(),
            ));
        }

        let credited = user.amount + fund.min_amount;
        self.write_balance(&user.id, credited).await?;

        let closed_item = match self
            .store
            .update(
                Table::UserBankFunds,
                &relation.id,
                vec![
                    (
                        "status".to_string(),
                        AttrValue::S(FundStatus::Closed.as_str().to_string()),
                    ),
                    ("updated_at".to_string(), AttrValue::S(now_iso())),
                ],
            )
            .await
        {
            Ok(item) => item,
            Err(e) => {
                // 反向补偿：冲回入账
                if let Err(comp) = self.write_balance(&user.id, user.amount).await {
                    Self::reconciliation_log(
                        "unsubscribe",
                        &user.id,
                        &format!(
                            "credit of {} not reversed after close failure: {comp}",
                            fund.min_amount
                        ),
                    );
                }
                return Err(e);
            }
        };

        // 固化关闭后的状态为第二条审计行
        let closed = UserBankFund::from_item(&closed_item)?;
        let audit = UserBankFundAudit::snapshot(&closed);
        if let Err(e) = self
            .store
            .put(Table::UserBankFundsAudit, audit.to_item())
            .await
        {
            // 关闭已对外可见，不再回滚，只留对账记录
            Self::reconciliation_log(
                "unsubscribe",
                &user.id,
                &format!("audit row missing for closed relation {}: {e}", closed.id),
            );
            return Err(e);
        }

        notify::send_best_effort(
            &self.notifier,
            &user.email,
            &emails::subscription_closed(&user.name, &fund),
        )
        .await;

        log::info!(
            "User {} unsubscribed from fund {}, {} {} returned",
            user.id,
            fund.id,
            fund.currency,
            fund.min_amount
        );
        Ok(closed)
    }

    /// 某用户的全部订阅，创建时间倒序
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<UserBankFund>> {
        let items = self
            .store
            .scan(
                Table::UserBankFunds,
                Some(ScanFilter::Eq(
                    "user_id".to_string(),
                    AttrValue::S(user_id.to_string()),
                )),
            )
            .await?;

        let mut relations = items
            .iter()
            .map(UserBankFund::from_item)
            .collect::<AppResult<Vec<_>>>()?;
        relations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(relations)
    }

    pub async fn get(&self, user_bank_fund_id: &str) -> AppResult<UserBankFund> {
        let item = self
            .store
            .get(Table::UserBankFunds, user_bank_fund_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User bank fund not found".to_string()))?;
        UserBankFund::from_item(&item)
    }

    /// 某用户的审计记录，创建时间倒序
    pub async fn list_audit_for_user(&self, user_id: &str) -> AppResult<Vec<UserBankFundAudit>> {
        let items = self
            .store
            .scan(
                Table::UserBankFundsAudit,
                Some(ScanFilter::Eq(
                    "user_id".to_string(),
                    AttrValue::S(user_id.to_string()),
                )),
            )
            .await?;

        let mut audits = items
            .iter()
            .map(UserBankFundAudit::from_item)
            .collect::<AppResult<Vec<_>>>()?;
        audits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(audits)
    }

    /// 单条审计记录，只在调用者自己的记录里找
    pub async fn get_audit(&self, user_id: &str, audit_id: &str) -> AppResult<UserBankFundAudit> {
        let audits = self.list_audit_for_user(user_id).await?;
        audits
            .into_iter()
            .find(|audit| audit.id == audit_id)
            .ok_or_else(|| AppError::NotFound("User bank funds audit not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Currency, Role};
    use crate::notify::Notifier;
    use crate::store::Item;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// 记录型邮件出口，测试断言用
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        async fn subjects_for(&self, recipient: &str) -> Vec<String> {
            self.sent
                .lock()
                .await
                .iter()
                .filter(|(to, _)| to == recipient)
                .map(|(_, subject)| subject.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, recipient: &str, subject: &str, _html_body: &str) -> AppResult<()> {
            self.sent
                .lock()
                .await
                .push((recipient.to_string(), subject.to_string()));
            Ok(())
        }
    }

    /// 指定表的put必然失败，用来打击补偿路径
    struct FailingPutStore {
        inner: MemoryStore,
        fail_table: Table,
    }

    #[async_trait]
    impl RecordStore for FailingPutStore {
        async fn get(&self, table: Table, key: &str) -> AppResult<Option<Item>> {
            self.inner.get(table, key).await
        }

        async fn put(&self, table: Table, item: Item) -> AppResult<()> {
            if table == self.fail_table {
                return Err(AppError::StoreError("injected put failure".to_string()));
            }
            self.inner.put(table, item).await
        }

        async fn update(
            &self,
            table: Table,
            key: &str,
            assignments: Vec<(String, AttrValue)>,
        ) -> AppResult<Item> {
            self.inner.update(table, key, assignments).await
        }

        async fn scan(&self, table: Table, filter: Option<ScanFilter>) -> AppResult<Vec<Item>> {
            self.inner.scan(table, filter).await
        }
    }

    async fn seed_user(store: &dyn RecordStore, id: &str) -> User {
        let mut user = User::new(
            id.to_string(),
            "123456789".to_string(),
            "Daniel".to_string(),
            "Ochoa".to_string(),
            "daniel@example.com".to_string(),
            "+573001234567".to_string(),
            Role::User,
            Currency::DEFAULT,
        );
        user.email = format!("{id}@example.com");
        store.put(Table::Users, user.to_item()).await.unwrap();
        user
    }

    async fn seed_fund(store: &dyn RecordStore, id: &str, min_amount: i64) -> BankFund {
        let mut fund = BankFund::new(
            "FPV_BTG_PACTUAL_RECAUDADORA".to_string(),
            "cat-1".to_string(),
            Decimal::from(min_amount),
            Some("COP"),
            "admin-1",
        );
        fund.id = id.to_string();
        store.put(Table::BankFunds, fund.to_item()).await.unwrap();
        fund
    }

    async fn balance_of(store: &dyn RecordStore, user_id: &str) -> Decimal {
        let item = store.get(Table::Users, user_id).await.unwrap().unwrap();
        User::from_item(&item).unwrap().amount
    }

    fn service_over(
        store: Arc<dyn RecordStore>,
    ) -> (SubscriptionService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (
            SubscriptionService::new(store, notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn test_subscribe_debits_balance_and_appends_audit() {
        let store = Arc::new(MemoryStore::new());
        let (service, notifier) = service_over(store.clone());
        let user = seed_user(store.as_ref(), "u-1").await;
        seed_fund(store.as_ref(), "f-1", 1000).await;

        let relation = service.subscribe("u-1", "f-1").await.unwrap();

        assert_eq!(relation.status, FundStatus::Open);
        assert_eq!(relation.amount, Decimal::from(1000));
        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(499_000)
        );

        let relations = service.list_for_user("u-1").await.unwrap();
        assert_eq!(relations.len(), 1);

        let audits = service.list_audit_for_user("u-1").await.unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].parent_id, relation.id);
        assert_eq!(audits[0].status, FundStatus::Open);

        let subjects = notifier.subjects_for(&user.email).await;
        assert_eq!(subjects, vec!["Fondo de Inversión Registrado".to_string()]);
    }

    #[tokio::test]
    async fn test_subscribe_with_insufficient_balance_mutates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (service, notifier) = service_over(store.clone());
        let user = seed_user(store.as_ref(), "u-1").await;
        seed_fund(store.as_ref(), "f-1", 600_000).await;

        let result = service.subscribe("u-1", "f-1").await;
        assert!(matches!(result, Err(AppError::InsufficientFunds(_))));

        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(500_000)
        );
        assert!(service.list_for_user("u-1").await.unwrap().is_empty());
        assert!(service.list_audit_for_user("u-1").await.unwrap().is_empty());

        let subjects = notifier.subjects_for(&user.email).await;
        assert_eq!(subjects, vec!["Fondo de Inversión Insuficiente".to_string()]);
    }

    #[tokio::test]
    async fn test_subscribe_unknown_user_or_fund_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_over(store.clone());

        assert!(matches!(
            service.subscribe("ghost", "f-1").await,
            Err(AppError::NotFound(_))
        ));

        seed_user(store.as_ref(), "u-1").await;
        assert!(matches!(
            service.subscribe("u-1", "ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unsubscribe_restores_balance_and_closes() {
        let store = Arc::new(MemoryStore::new());
        let (service, notifier) = service_over(store.clone());
        let user = seed_user(store.as_ref(), "u-1").await;
        seed_fund(store.as_ref(), "f-1", 1000).await;

        let relation = service.subscribe("u-1", "f-1").await.unwrap();
        let closed = service.unsubscribe("u-1", &relation.id).await.unwrap();

        assert_eq!(closed.status, FundStatus::Closed);
        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(500_000)
        );

        let audits = service.list_audit_for_user("u-1").await.unwrap();
        assert_eq!(audits.len(), 2);
        assert!(
            audits
                .iter()
                .any(|audit| audit.parent_id == relation.id
                    && audit.status == FundStatus::Closed)
        );

        let subjects = notifier.subjects_for(&user.email).await;
        assert_eq!(subjects.last().unwrap(), "Fondo de Inversión Retirado");
    }

    #[tokio::test]
    async fn test_double_unsubscribe_is_conflict_and_credits_once() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_over(store.clone());
        seed_user(store.as_ref(), "u-1").await;
        seed_fund(store.as_ref(), "f-1", 1000).await;

        let relation = service.subscribe("u-1", "f-1").await.unwrap();
        service.unsubscribe("u-1", &relation.id).await.unwrap();

        let second = service.unsubscribe("u-1", &relation.id).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(500_000)
        );
        assert_eq!(service.list_audit_for_user("u-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_relation_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_over(store.clone());
        seed_user(store.as_ref(), "u-1").await;

        assert!(matches!(
            service.unsubscribe("u-1", "ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_relation_write_refunds_debit() {
        let inner = MemoryStore::new();
        seed_user(&inner, "u-1").await;
        seed_fund(&inner, "f-1", 1000).await;
        let store = Arc::new(FailingPutStore {
            inner,
            fail_table: Table::UserBankFunds,
        });
        let (service, _) = service_over(store.clone());

        let result = service.subscribe("u-1", "f-1").await;
        assert!(result.is_err());

        // 扣款已被补偿冲回
        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(500_000)
        );
        assert!(service.list_for_user("u-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_audit_write_unwinds_subscription() {
        let inner = MemoryStore::new();
        seed_user(&inner, "u-1").await;
        seed_fund(&inner, "f-1", 1000).await;
        let store = Arc::new(FailingPutStore {
            inner,
            fail_table: Table::UserBankFundsAudit,
        });
        let (service, _) = service_over(store.clone());

        let result = service.subscribe("u-1", "f-1").await;
        assert!(result.is_err());

        assert_eq!(
            balance_of(store.as_ref(), "u-1").await,
            Decimal::from(500_000)
        );
        // 补偿把半成品订阅关掉了
        let relations = service.list_for_user("u-1").await.unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].status, FundStatus::Closed);
    }

    #[tokio::test]
    async fn test_audit_scope_is_per_user() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_over(store.clone());
        seed_user(store.as_ref(), "u-1").await;
        seed_user(store.as_ref(), "u-2").await;
        seed_fund(store.as_ref(), "f-1", 1000).await;

        service.subscribe("u-1", "f-1").await.unwrap();
        let audits = service.list_audit_for_user("u-1").await.unwrap();
        let audit_id = &audits[0].id;

        assert!(service.get_audit("u-1", audit_id).await.is_ok());
        assert!(matches!(
            service.get_audit("u-2", audit_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
