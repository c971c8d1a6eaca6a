//! Burn rate engine storage backed by the database

use chrono::NaiveDate;

use super::Database;
use crate::burn::{BurnRateStore, PoolEntry, PoolFilter};
use crate::error::Result;
use crate::models::{FeedbackRecord, SpendingGroup};

impl BurnRateStore for Database {
    fn get_target(&self, group: SpendingGroup) -> Result<Option<f64>> {
        Database::get_target(self, group)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Database::get_setting(self, key)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        Database::set_setting(self, key, value)
    }

    fn list_category_ids(&self, group: SpendingGroup) -> Result<Vec<i64>> {
        Database::list_category_ids(self, group)
    }

    fn query_transactions(
        &self,
        category_ids: &[i64],
        from: NaiveDate,
        to: NaiveDate,
        filter: PoolFilter,
    ) -> Result<Vec<PoolEntry>> {
        self.query_pool(category_ids, from, to, filter)
    }

    fn record_feedback(&self, record: &FeedbackRecord, new_target: Option<f64>) -> Result<()> {
        Database::record_feedback(self, record, new_target).map(|_| ())
    }
}
