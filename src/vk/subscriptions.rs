//! Per-user subscription resolution.

use std::sync::Arc;

use log::debug;

use crate::vk::client::VkClient;
use crate::vk::error::VkError;
use crate::vk::model::GroupProfile;

/// Resolves the communities one user is subscribed to, capped at a
/// configured limit taken from the head of the upstream order.
pub struct SubscriptionResolver {
    client: Arc<VkClient>,
    sub_limit: usize,
}

impl SubscriptionResolver {
    pub fn new(client: Arc<VkClient>, sub_limit: usize) -> Self {
        Self { client, sub_limit }
    }

    /// Returns the `(id, name)` communities for one user.
    ///
    /// An empty result means the user follows nothing trackable; that is a
    /// distinct outcome from an error, and no resolution call is issued for
    /// it. Any failure is wrapped with the user ID so an operator can
    /// inspect the profile by hand.
    pub async fn resolve(&self, user_id: i64) -> Result<Vec<GroupProfile>, VkError> {
        self.resolve_inner(user_id)
            .await
            .map_err(|source| VkError::SubscriptionLookupFailed {
                user_id,
                source: Box::new(source),
            })
    }

    async fn resolve_inner(&self, user_id: i64) -> Result<Vec<GroupProfile>, VkError> {
        let (count, ids) = self.client.subscription_groups(user_id).await?;
        let ids = Self::apply_cap(count, ids, self.sub_limit);

        if ids.is_empty() {
            debug!("User {user_id} has no subscriptions");
            return Ok(Vec::new());
        }

        self.client.resolve_groups(&ids).await
    }

    /// Source-order truncation, no sorting: the upstream ranking is kept.
    fn apply_cap(count: u64, mut ids: Vec<i64>, cap: usize) -> Vec<i64> {
        if count as usize > cap {
            ids.truncate(cap);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_keeps_head_order_when_over_limit() {
        let ids: Vec<i64> = (1..=600).collect();
        let capped = SubscriptionResolver::apply_cap(600, ids, 500);
        assert_eq!(capped.len(), 500);
        assert_eq!(capped[0], 1);
        assert_eq!(capped[499], 500);
    }

    #[test]
    fn cap_is_noop_at_the_limit() {
        let ids: Vec<i64> = (1..=500).collect();
        assert_eq!(SubscriptionResolver::apply_cap(500, ids, 500).len(), 500);
    }

    #[test]
    fn cap_is_noop_below_the_limit() {
        let ids: Vec<i64> = (1..=3).collect();
        assert_eq!(SubscriptionResolver::apply_cap(3, ids, 500), vec![1, 2, 3]);
    }
}
