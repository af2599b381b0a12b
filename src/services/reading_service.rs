use std::sync::Arc;

use crate::db::{DbError, ReadingStore, StoredReading, DEFAULT_HISTORY_LIMIT};

#[derive(Clone)]
pub struct ReadingService {
    store: Arc<dyn ReadingStore>,
}

impl ReadingService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Recorded readings, newest first; 24 unless a limit is given
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<StoredReading>, DbError> {
        self.store
            .recent(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await
    }
}
