//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use wipay_core::{
    apply_bulk_action, BulkAction, HotspotConfig, Invoice, InvoiceId, PaymentProfile, Quota,
    Subscription, Token, TokenId, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Get and deserialize a single record.
    fn get_record<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Serialize and put a single record.
    fn put_record<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let encoded = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, encoded)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Collect index keys under a user prefix, newest first, with pagination.
    fn paged_index_keys(
        &self,
        cf_name: &str,
        prefix: &[u8],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let cf = self.cf(cf_name)?;

        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(prefix, rocksdb::Direction::Forward),
        );

        // Collect all matching keys first; ULIDs are naturally time-ordered,
        // so reversing gives newest first.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        Ok(all_keys.into_iter().skip(offset).take(limit).collect())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Subscription Operations
    // =========================================================================

    fn put_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.put_record(
            cf::SUBSCRIPTIONS,
            &keys::user_key(&subscription.user_id),
            subscription,
        )
    }

    fn get_subscription(&self, user_id: &UserId) -> Result<Option<Subscription>> {
        self.get_record(cf::SUBSCRIPTIONS, &keys::user_key(user_id))
    }

    // =========================================================================
    // Payment Profile Operations
    // =========================================================================

    fn put_payment_profile(&self, profile: &PaymentProfile) -> Result<()> {
        self.put_record(
            cf::PAYMENT_PROFILES,
            &keys::user_key(&profile.user_id),
            profile,
        )
    }

    fn get_payment_profile(&self, user_id: &UserId) -> Result<Option<PaymentProfile>> {
        self.get_record(cf::PAYMENT_PROFILES, &keys::user_key(user_id))
    }

    // =========================================================================
    // Hotspot Config Operations
    // =========================================================================

    fn put_hotspot_config(&self, user_id: &UserId, config: &HotspotConfig) -> Result<()> {
        self.put_record(cf::HOTSPOT_CONFIGS, &keys::user_key(user_id), config)
    }

    fn get_hotspot_config(&self, user_id: &UserId) -> Result<Option<HotspotConfig>> {
        self.get_record(cf::HOTSPOT_CONFIGS, &keys::user_key(user_id))
    }

    // =========================================================================
    // Token Operations
    // =========================================================================

    fn get_token(&self, token_id: &TokenId) -> Result<Option<Token>> {
        self.get_record(cf::TOKENS, &keys::token_key(token_id))
    }

    fn update_token(&self, token: &Token) -> Result<()> {
        if self.get_token(&token.id)?.is_none() {
            return Err(StoreError::NotFound);
        }
        self.put_record(cf::TOKENS, &keys::token_key(&token.id), token)
    }

    fn list_tokens_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Token>> {
        let prefix = keys::user_tokens_prefix(user_id);
        let index_keys = self.paged_index_keys(cf::TOKENS_BY_USER, &prefix, limit, offset)?;

        let mut tokens = Vec::with_capacity(index_keys.len());
        for key in index_keys {
            let token_id = keys::extract_token_id_from_user_key(&key);
            if let Some(token) = self.get_token(&token_id)? {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }

    // =========================================================================
    // Invoice Operations
    // =========================================================================

    fn put_invoice(&self, invoice: &Invoice) -> Result<()> {
        let cf_invoices = self.cf(cf::INVOICES)?;
        let cf_by_user = self.cf(cf::INVOICES_BY_USER)?;

        let invoice_key = keys::invoice_key(&invoice.id);
        let user_invoice_key = keys::user_invoice_key(&invoice.user_id, &invoice.id);
        let value = Self::serialize(invoice)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_invoices, &invoice_key, &value);
        batch.put_cf(&cf_by_user, &user_invoice_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_invoice(&self, invoice_id: &InvoiceId) -> Result<Option<Invoice>> {
        self.get_record(cf::INVOICES, &keys::invoice_key(invoice_id))
    }

    fn list_invoices_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Invoice>> {
        let prefix = keys::user_key(user_id);
        let index_keys = self.paged_index_keys(cf::INVOICES_BY_USER, &prefix, limit, offset)?;

        let mut invoices = Vec::with_capacity(index_keys.len());
        for key in index_keys {
            let invoice_id = keys::extract_invoice_id_from_user_key(&key);
            if let Some(invoice) = self.get_invoice(&invoice_id)? {
                invoices.push(invoice);
            }
        }

        Ok(invoices)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn issue_token(&self, token: &Token) -> Result<Subscription> {
        let mut subscription = self
            .get_subscription(&token.user_id)?
            .ok_or(StoreError::NotFound)?;

        // Quota check and increment happen here, inside the same call that
        // writes the batch, never split across caller steps.
        if let Quota::Limited(limit) = subscription.plan.monthly_token_quota() {
            if subscription.tokens_used_this_month >= limit {
                return Err(StoreError::QuotaExceeded {
                    used: subscription.tokens_used_this_month,
                    limit,
                });
            }
        }

        subscription.record_issuance();

        let cf_tokens = self.cf(cf::TOKENS)?;
        let cf_by_user = self.cf(cf::TOKENS_BY_USER)?;
        let cf_subs = self.cf(cf::SUBSCRIPTIONS)?;

        let token_key = keys::token_key(&token.id);
        let user_token_key = keys::user_token_key(&token.user_id, &token.id);
        let sub_key = keys::user_key(&token.user_id);

        let token_value = Self::serialize(token)?;
        let sub_value = Self::serialize(&subscription)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_tokens, &token_key, &token_value);
        batch.put_cf(&cf_by_user, &user_token_key, []);
        batch.put_cf(&cf_subs, &sub_key, &sub_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(subscription)
    }

    fn bulk_apply(&self, user_ids: &[UserId], action: &BulkAction) -> Result<usize> {
        let now = chrono::Utc::now();

        // Read everything up front so a missing record fails the batch before
        // anything is written.
        let mut updates = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let mut profile = self
                .get_payment_profile(user_id)?
                .ok_or(StoreError::NotFound)?;
            let mut subscription = self
                .get_subscription(user_id)?
                .ok_or(StoreError::NotFound)?;

            apply_bulk_action(&mut profile, &mut subscription, action, now);
            updates.push((profile, subscription));
        }

        let cf_profiles = self.cf(cf::PAYMENT_PROFILES)?;
        let cf_subs = self.cf(cf::SUBSCRIPTIONS)?;

        let mut batch = WriteBatch::default();
        for (profile, subscription) in &updates {
            let key = keys::user_key(&profile.user_id);
            batch.put_cf(&cf_profiles, &key, Self::serialize(profile)?);
            batch.put_cf(&cf_subs, &key, Self::serialize(subscription)?);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!(
            accounts = updates.len(),
            action = ?action,
            "Bulk action applied"
        );

        Ok(updates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wipay_core::{
        AccountStatus, PaymentMethod, Plan, PricingConfig, SubscriptionStatus, TokenDuration,
    };

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn setup_account(store: &RocksStore, plan: Plan) -> UserId {
        let user_id = UserId::generate();
        let mut subscription = Subscription::new_free(user_id, 1);
        subscription.plan = plan;
        store.put_subscription(&subscription).unwrap();

        let profile =
            PaymentProfile::new(user_id, "+211920000001".into(), "A. Deng".into(), 1);
        store.put_payment_profile(&profile).unwrap();
        user_id
    }

    fn test_token(user_id: UserId) -> Token {
        Token::issue(
            user_id,
            "+211920000002".into(),
            TokenDuration::OneHour,
            PaymentMethod::Cash,
            &PricingConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn subscription_crud() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();
        let subscription = Subscription::new_free(user_id, 15);

        store.put_subscription(&subscription).unwrap();

        let retrieved = store.get_subscription(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.plan, Plan::Free);
        assert_eq!(retrieved.billing_day, 15);

        assert!(store
            .get_subscription(&UserId::generate())
            .unwrap()
            .is_none());
    }

    #[test]
    fn hotspot_config_roundtrip() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        assert!(store.get_hotspot_config(&user_id).unwrap().is_none());

        let config = HotspotConfig::new("JubaNet".into());
        store.put_hotspot_config(&user_id, &config).unwrap();

        let retrieved = store.get_hotspot_config(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.ssid, "JubaNet");
    }

    #[test]
    fn issue_token_increments_usage() {
        let (store, _dir) = create_test_store();
        let user_id = setup_account(&store, Plan::Basic);

        let token = test_token(user_id);
        let subscription = store.issue_token(&token).unwrap();
        assert_eq!(subscription.tokens_used_this_month, 1);

        let stored = store.get_token(&token.id).unwrap().unwrap();
        assert_eq!(stored.recipient_phone, "+211920000002");

        let listed = store.list_tokens_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn issue_token_enforces_quota() {
        let (store, _dir) = create_test_store();
        let user_id = setup_account(&store, Plan::Free); // 10 tokens/month

        for _ in 0..10 {
            store.issue_token(&test_token(user_id)).unwrap();
        }

        let result = store.issue_token(&test_token(user_id));
        assert!(matches!(
            result,
            Err(StoreError::QuotaExceeded { used: 10, limit: 10 })
        ));

        // Counter unchanged after the rejection
        let subscription = store.get_subscription(&user_id).unwrap().unwrap();
        assert_eq!(subscription.tokens_used_this_month, 10);
    }

    #[test]
    fn issue_token_without_subscription_fails() {
        let (store, _dir) = create_test_store();
        let token = test_token(UserId::generate());
        assert!(matches!(
            store.issue_token(&token),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn list_tokens_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let user_id = setup_account(&store, Plan::Enterprise);

        let first = test_token(user_id);
        store.issue_token(&first).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2)); // Ensure different ULIDs

        let second = test_token(user_id);
        store.issue_token(&second).unwrap();

        let tokens = store.list_tokens_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].id, second.id); // Newest first
        assert_eq!(tokens[1].id, first.id);

        let page1 = store.list_tokens_by_user(&user_id, 1, 0).unwrap();
        let page2 = store.list_tokens_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page1[0].id, second.id);
        assert_eq!(page2[0].id, first.id);
    }

    #[test]
    fn update_token_persists_deactivation() {
        let (store, _dir) = create_test_store();
        let user_id = setup_account(&store, Plan::Basic);

        let mut token = test_token(user_id);
        store.issue_token(&token).unwrap();

        token.deactivate();
        store.update_token(&token).unwrap();

        let stored = store.get_token(&token.id).unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[test]
    fn update_missing_token_fails() {
        let (store, _dir) = create_test_store();
        let token = test_token(UserId::generate());
        assert!(matches!(
            store.update_token(&token),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn invoice_roundtrip_and_listing() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let invoice = Invoice::new(
            user_id,
            "Juba Cafe".into(),
            wipay_core::PlanType::Postpaid,
            100,
            true,
            false,
            18.0,
            chrono::Utc::now(),
        );
        store.put_invoice(&invoice).unwrap();

        let retrieved = store.get_invoice(&invoice.id).unwrap().unwrap();
        assert_eq!(retrieved.total_amount, 354);

        let listed = store.list_invoices_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn bulk_suspend_and_activate_round_trip() {
        let (store, _dir) = create_test_store();
        let users: Vec<UserId> = (0..3).map(|_| setup_account(&store, Plan::Basic)).collect();

        let updated = store.bulk_apply(&users, &BulkAction::Suspend).unwrap();
        assert_eq!(updated, 3);

        for user_id in &users {
            let profile = store.get_payment_profile(user_id).unwrap().unwrap();
            assert_eq!(profile.account_status, AccountStatus::Suspended);
            let subscription = store.get_subscription(user_id).unwrap().unwrap();
            assert_eq!(subscription.status, SubscriptionStatus::PastDue);
        }

        store.bulk_apply(&users, &BulkAction::Activate).unwrap();

        for user_id in &users {
            let profile = store.get_payment_profile(user_id).unwrap().unwrap();
            assert_eq!(profile.account_status, AccountStatus::Active);
            let subscription = store.get_subscription(user_id).unwrap().unwrap();
            assert_eq!(subscription.status, SubscriptionStatus::Active);
        }
    }

    #[test]
    fn bulk_apply_is_all_or_nothing() {
        let (store, _dir) = create_test_store();
        let good = setup_account(&store, Plan::Basic);
        let missing = UserId::generate();

        let result = store.bulk_apply(&[good, missing], &BulkAction::Suspend);
        assert!(matches!(result, Err(StoreError::NotFound)));

        // The existing account must be untouched.
        let profile = store.get_payment_profile(&good).unwrap().unwrap();
        assert_eq!(profile.account_status, AccountStatus::Active);
    }
}
