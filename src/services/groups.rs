//! Group membership seam.
//!
//! Plans may name an access group; activation adds the subscriber to it and
//! deactivation removes them. Hosts bind this to their own identity system,
//! [`MemoryGroups`] covers tests and embedded use.

use crate::error::AppError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Grants and revokes group membership for subscribers.
#[async_trait]
pub trait GroupProvider: Send + Sync {
    /// Add the user to the named group. Adding an existing member is a no-op.
    async fn add_user(&self, group: &str, user_id: Uuid) -> Result<(), AppError>;

    /// Remove the user from the named group. Removing a non-member is a no-op.
    async fn remove_user(&self, group: &str, user_id: Uuid) -> Result<(), AppError>;
}

/// In-memory [`GroupProvider`].
#[derive(Clone, Default)]
pub struct MemoryGroups {
    members: Arc<RwLock<HashMap<String, HashSet<Uuid>>>>,
}

impl MemoryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_member(&self, group: &str, user_id: Uuid) -> bool {
        self.members
            .read()
            .await
            .get(group)
            .is_some_and(|members| members.contains(&user_id))
    }
}

#[async_trait]
impl GroupProvider for MemoryGroups {
    async fn add_user(&self, group: &str, user_id: Uuid) -> Result<(), AppError> {
        self.members
            .write()
            .await
            .entry(group.to_string())
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn remove_user(&self, group: &str, user_id: Uuid) -> Result<(), AppError> {
        if let Some(members) = self.members.write().await.get_mut(group) {
            members.remove(&user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_membership_round_trip() {
        block_on(async {
            let groups = MemoryGroups::new();
            let user = Uuid::new_v4();

            groups.add_user("premium", user).await.unwrap();
            assert!(groups.is_member("premium", user).await);

            groups.remove_user("premium", user).await.unwrap();
            assert!(!groups.is_member("premium", user).await);

            // Removing again stays quiet
            groups.remove_user("premium", user).await.unwrap();
        });
    }
}
