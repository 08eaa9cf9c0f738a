use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::Admin;

/// Lookup interface over wherever administrator accounts live. The
/// security core only ever asks one question of it.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by its normalized (trimmed, lowercased) email.
    async fn find_by_email(&self, email: &str) -> Option<Admin>;
}

/// Account store backed by a process-local map. Holds the bootstrap
/// administrator in production and whatever fixtures a test seeds.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Admin>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, admin: Admin) {
        self.accounts.insert(admin.email.trim().to_lowercase(), admin);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Option<Admin> {
        self.accounts.get(email).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_ADMINISTRATOR;
    use uuid::Uuid;

    #[test]
    fn test_lookup_is_by_normalized_email() {
        let store = InMemoryAccountStore::new();
        store.insert(Admin {
            id: Uuid::new_v4(),
            email: "Clerk@Townpost.Local".to_string(),
            password_hash: "hash".to_string(),
            name: "Town Clerk".to_string(),
            role: ROLE_ADMINISTRATOR.to_string(),
        });

        tokio_test::block_on(async {
            assert!(store.find_by_email("clerk@townpost.local").await.is_some());
            assert!(store.find_by_email("other@townpost.local").await.is_none());
        });
    }
}
