//! In-memory phone line repository
//!
//! Concurrent map-backed implementation of the repository port. Records are
//! held for the lifetime of the process; durability and eviction are out of
//! scope, callers needing them plug in a different implementation behind the
//! same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use lineforge_core::provisioning::{PhoneLineRepository, StoreError};
use lineforge_domain::{AreaCode, IdempotencyKey, PhoneLine};
use tracing::debug;
use uuid::Uuid;

/// Map-backed [`PhoneLineRepository`].
///
/// Keeps a primary map by line id plus an idempotency-key index, so the
/// key lookup on every creation attempt stays O(1).
#[derive(Debug, Default)]
pub struct InMemoryPhoneLineRepository {
    lines: DashMap<Uuid, PhoneLine>,
    key_index: DashMap<String, Uuid>,
}

impl InMemoryPhoneLineRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored phone lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the repository holds no phone lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every stored record.
    pub fn clear(&self) {
        self.lines.clear();
        self.key_index.clear();
    }
}

#[async_trait]
impl PhoneLineRepository for InMemoryPhoneLineRepository {
    async fn save(&self, line: PhoneLine) -> Result<(), StoreError> {
        debug!(id = %line.id, key = %line.idempotency_key, "storing phone line");
        self.key_index.insert(line.idempotency_key.value().to_string(), line.id);
        self.lines.insert(line.id, line);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PhoneLine>, StoreError> {
        Ok(self.lines.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<PhoneLine>, StoreError> {
        let id = self.key_index.get(key.value()).map(|entry| *entry.value());
        Ok(id.and_then(|id| self.lines.get(&id).map(|entry| entry.value().clone())))
    }

    async fn find_by_area_code(&self, area_code: AreaCode) -> Result<Vec<PhoneLine>, StoreError> {
        Ok(self
            .lines
            .iter()
            .filter(|entry| entry.value().area_code == area_code)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<PhoneLine>, StoreError> {
        Ok(self.lines.iter().map(|entry| entry.value().clone()).collect())
    }
}
