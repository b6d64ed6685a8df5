//! Process-local credential store.

use tokio::sync::Mutex;

use crate::table::IdentityTable;
use crate::{
    CredentialStore, DEFAULT_ADMIN_ID, Identity, NewIdentity, StoreError,
    StoredCredential, UserId,
};

/// Keeps every identity in memory behind an async mutex.
///
/// Nothing survives a restart. Good for tests, demos, and single-process
/// deployments that seed their users at startup.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    table: Mutex<IdentityTable>,
}

impl MemoryCredentialStore {
    /// Creates an empty store whose identity `admin_id` becomes the admin.
    pub fn new(admin_id: UserId) -> Self {
        Self {
            table: Mutex::new(IdentityTable::new(admin_id)),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_ID)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.find_by_email(email).map(|row| row.identity().clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.find_by_id(id).map(|row| row.identity().clone()))
    }

    async fn credential_for(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredential>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.find_by_email(email).cloned())
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let identity = self.table.lock().await.insert(new)?;
        tracing::debug!(user_id = %identity.id, "identity row inserted");
        Ok(identity)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.lock().await.len())
    }
}
