use crate::domain::model::NewsRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A read-only backend producing news records.
///
/// Implementations absorb transport and decode failures themselves and hand
/// back an empty list (or `None`). An `Err` means the adapter could not run
/// at all, which callers treat as a reason to try another source.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load_all(&self) -> Result<Vec<NewsRecord>>;

    /// First record whose id matches.
    async fn get_by_id(&self, id: i64) -> Result<Option<NewsRecord>> {
        let records = self.load_all().await?;
        Ok(records.into_iter().find(|record| record.id == id))
    }

    /// Records carrying `tag` exactly (case-sensitive), in load order.
    async fn get_by_tag(&self, tag: &str) -> Result<Vec<NewsRecord>> {
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .filter(|record| record.has_tag(tag))
            .collect())
    }
}
