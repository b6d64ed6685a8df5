//! Credential store persisted as a single JSON document.
//!
//! The whole table is loaded at open and rewritten on every mutation.
//! Writes go to a sibling temp file first and are then renamed over the
//! real one, so a crash mid-write leaves the previous version intact.

use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::table::{IdentityTable, TableDocument};
use crate::{
    CredentialStore, Identity, NewIdentity, StoreError, StoredCredential, UserId,
};

/// A [`CredentialStore`] backed by one JSON file on disk.
#[derive(Debug)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
    table: Mutex<IdentityTable>,
}

impl JsonFileCredentialStore {
    /// Opens the store at `path`, creating an empty table if the file does
    /// not exist yet. The file itself is only written on the first create.
    ///
    /// # Errors
    /// - [`StoreError::Unavailable`]: the file exists but can't be read
    /// - [`StoreError::Corrupt`]: the file isn't a valid identity table
    pub async fn open(
        path: impl AsRef<Path>,
        admin_id: UserId,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let doc: TableDocument = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                IdentityTable::from_document(doc, admin_id)?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                IdentityTable::new(admin_id)
            }
            Err(e) => return Err(StoreError::Unavailable(e)),
        };

        tracing::info!(
            path = %path.display(),
            identities = table.len(),
            "credential store opened"
        );
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &IdentityTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&table.to_document())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl CredentialStore for JsonFileCredentialStore {
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
        // Hold the lock across the write so concurrent creates persist in
        // the same order they were accepted.
        let mut table = self.table.lock().await;
        let identity = table.insert(new)?;

        if let Err(e) = self.persist(&table).await {
            table.rollback(&identity);
            tracing::warn!(error = %e, "failed to persist new identity");
            return Err(e);
        }

        tracing::debug!(user_id = %identity.id, "identity row persisted");
        Ok(identity)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.lock().await.len())
    }
}
