//! The in-memory identity table shared by both store implementations.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    Identity, NewIdentity, Role, StoreError, StoredCredential, UserId,
};

/// Rows keyed by id, plus a unique index on email.
///
/// Not thread-safe on its own; each store wraps it in a mutex and performs
/// every check-then-insert under a single lock acquisition.
#[derive(Debug)]
pub(crate) struct IdentityTable {
    rows: BTreeMap<UserId, StoredCredential>,
    by_email: HashMap<String, UserId>,
    next_id: u64,
    admin_id: UserId,
}

/// On-disk shape of the table.
#[derive(Serialize, Deserialize)]
pub(crate) struct TableDocument {
    pub(crate) next_id: u64,
    pub(crate) users: Vec<StoredCredential>,
}

impl IdentityTable {
    pub(crate) fn new(admin_id: UserId) -> Self {
        Self {
            rows: BTreeMap::new(),
            by_email: HashMap::new(),
            next_id: 1,
            admin_id,
        }
    }

    /// Rebuilds a table (and its email index) from a persisted document.
    pub(crate) fn from_document(
        doc: TableDocument,
        admin_id: UserId,
    ) -> Result<Self, StoreError> {
        let mut table = Self::new(admin_id);
        for row in doc.users {
            let id = row.identity().id;
            let email = row.identity().email.clone();
            if table.by_email.insert(email, id).is_some() {
                return Err(StoreError::Corrupt(format!(
                    "duplicate email on row {id}"
                )));
            }
            if table.rows.insert(id, row).is_some() {
                return Err(StoreError::Corrupt(format!("duplicate id {id}")));
            }
        }
        let highest = table.rows.keys().next_back().map_or(0, |id| id.0);
        let after_highest = highest.checked_add(1).ok_or_else(|| {
            StoreError::Corrupt(format!("id {highest} leaves no room for new rows"))
        })?;
        table.next_id = doc.next_id.max(after_highest);
        Ok(table)
    }

    pub(crate) fn to_document(&self) -> TableDocument {
        TableDocument {
            next_id: self.next_id,
            users: self.rows.values().cloned().collect(),
        }
    }

    pub(crate) fn find_by_email(&self, email: &str) -> Option<&StoredCredential> {
        self.by_email.get(email).and_then(|id| self.rows.get(id))
    }

    pub(crate) fn find_by_id(&self, id: UserId) -> Option<&StoredCredential> {
        self.rows.get(&id)
    }

    /// Checks uniqueness and inserts. Returns the new identity.
    pub(crate) fn insert(&mut self, new: NewIdentity) -> Result<Identity, StoreError> {
        if self.by_email.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = UserId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Corrupt("identity ids exhausted".to_string()))?;

        let identity = Identity {
            id,
            name: new.name,
            email: new.email,
            role: Role::for_new_identity(id, self.admin_id),
        };
        self.by_email.insert(identity.email.clone(), id);
        self.rows
            .insert(id, StoredCredential::new(identity.clone(), new.password_hash));
        Ok(identity)
    }

    /// Undoes an [`insert`](Self::insert) whose persistence failed.
    pub(crate) fn rollback(&mut self, identity: &Identity) {
        self.rows.remove(&identity.id);
        self.by_email.remove(&identity.email);
        if identity.id.0.checked_add(1) == Some(self.next_id) {
            self.next_id = identity.id.0;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use quill_password::HashedPassword;

    use super::*;

    fn new_identity(name: &str, email: &str) -> NewIdentity {
        NewIdentity {
            name: name.into(),
            email: email.into(),
            password_hash: HashedPassword::from_stored("$argon2id$stub"),
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids_and_roles() {
        let mut table = IdentityTable::new(UserId(1));

        let alice = table.insert(new_identity("Alice", "a@x.com")).unwrap();
        let bob = table.insert(new_identity("Bob", "b@x.com")).unwrap();

        assert_eq!(alice.id, UserId(1));
        assert_eq!(alice.role, Role::Admin);
        assert_eq!(bob.id, UserId(2));
        assert_eq!(bob.role, Role::Member);
    }

    #[test]
    fn test_insert_duplicate_email_leaves_table_unchanged() {
        let mut table = IdentityTable::new(UserId(1));
        table.insert(new_identity("Alice", "a@x.com")).unwrap();

        let result = table.insert(new_identity("Imposter", "a@x.com"));

        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.next_id, 2, "a rejected insert must not burn an id");
    }

    #[test]
    fn test_email_lookup_is_case_sensitive() {
        let mut table = IdentityTable::new(UserId(1));
        table.insert(new_identity("Alice", "a@x.com")).unwrap();

        assert!(table.find_by_email("A@X.COM").is_none());
        assert!(table.insert(new_identity("Alice2", "A@x.com")).is_ok());
    }

    #[test]
    fn test_rollback_removes_row_and_reclaims_id() {
        let mut table = IdentityTable::new(UserId(1));
        let alice = table.insert(new_identity("Alice", "a@x.com")).unwrap();

        table.rollback(&alice);

        assert_eq!(table.len(), 0);
        assert!(table.find_by_email("a@x.com").is_none());
        let again = table.insert(new_identity("Alice", "a@x.com")).unwrap();
        assert_eq!(again.id, UserId(1));
    }

    #[test]
    fn test_from_document_rejects_duplicate_emails() {
        let mut source = IdentityTable::new(UserId(1));
        source.insert(new_identity("Alice", "a@x.com")).unwrap();
        let mut doc = source.to_document();
        let mut twin = doc.users[0].identity().clone();
        twin.id = UserId(2);
        let hash = doc.users[0].password_hash().clone();
        doc.users.push(StoredCredential::new(twin, hash));

        let result = IdentityTable::from_document(doc, UserId(1));

        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_from_document_next_id_never_reuses_existing_id() {
        let mut source = IdentityTable::new(UserId(1));
        source.insert(new_identity("Alice", "a@x.com")).unwrap();
        source.insert(new_identity("Bob", "b@x.com")).unwrap();
        let mut doc = source.to_document();
        doc.next_id = 1;

        let mut table = IdentityTable::from_document(doc, UserId(1)).unwrap();
        let carol = table.insert(new_identity("Carol", "c@x.com")).unwrap();

        assert_eq!(carol.id, UserId(3));
    }

    #[test]
    fn test_from_document_max_id_returns_corrupt() {
        let mut source = IdentityTable::new(UserId(1));
        source.insert(new_identity("Alice", "a@x.com")).unwrap();
        let mut doc = source.to_document();
        let mut last = doc.users[0].identity().clone();
        last.id = UserId(u64::MAX);
        let hash = doc.users[0].password_hash().clone();
        doc.users[0] = StoredCredential::new(last, hash);

        let result = IdentityTable::from_document(doc, UserId(1));

        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_insert_at_id_ceiling_returns_corrupt_and_keeps_table() {
        let doc = TableDocument {
            next_id: u64::MAX,
            users: Vec::new(),
        };
        let mut table = IdentityTable::from_document(doc, UserId(1)).unwrap();

        let result = table.insert(new_identity("Alice", "a@x.com"));

        assert!(matches!(result, Err(StoreError::Corrupt(_))));
        assert_eq!(table.len(), 0);
        assert!(table.find_by_email("a@x.com").is_none());
    }
}
