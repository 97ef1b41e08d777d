use std::sync::Arc;

use crate::{errors::ServiceError, storage::KvStore};

/// Mints record identities from store-side counters.
///
/// Uniqueness rests entirely on the store's atomic increment; nothing is
/// locked or cached on this side.
#[derive(Clone)]
pub struct IdGenerator {
    store: Arc<dyn KvStore>,
}

impl IdGenerator {
    pub fn new(store: Arc<dyn KvStore>) -> Self { Self { store } }

    pub async fn next_id(&self, counter_key: &str) -> Result<i64, ServiceError> {
        self.store.incr(counter_key).await
    }
}
