//! One-time bulk enumeration of group members.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use log::info;

use crate::config::Config;
use crate::database::Database;
use crate::database::model::UserModel;
use crate::database::model::UserStatus;
use crate::service::error::ServiceError;
use crate::vk::VkClient;

/// Enumerates all members of the configured group page by page and stores
/// the trackable ones as unprocessed users.
pub struct MemberSyncService {
    db: Arc<Database>,
    client: Arc<VkClient>,
    group_id: String,
    offset_size: u64,
}

/// Final counters of one bootstrap run, for the host to render.
#[derive(Debug)]
pub struct BootstrapReport {
    pub members_total: u64,
    pub members_stored: u64,
    pub pages: u64,
    pub elapsed: Duration,
}

impl MemberSyncService {
    pub fn new(db: Arc<Database>, client: Arc<VkClient>, config: &Config) -> Self {
        Self {
            db,
            client,
            group_id: config.group_id.clone(),
            offset_size: config.offset_size,
        }
    }

    /// Fetches every member page, resolves profiles, filters out
    /// deactivated/closed accounts and bulk-inserts the rest, one
    /// transaction per page.
    pub async fn bootstrap(&self) -> Result<BootstrapReport, ServiceError> {
        let start = Instant::now();

        let count = self.client.count_group_members(&self.group_id).await?;
        let pages = Self::page_count(count, self.offset_size);

        info!(
            "Group {}: {count} members, {pages} pages of up to {} each",
            self.group_id, self.offset_size
        );

        let mut stored: u64 = 0;
        for page in 0..pages {
            let offset = page * self.offset_size;
            info!(
                "Receiving page {}/{pages} ({}s elapsed)",
                page + 1,
                start.elapsed().as_secs()
            );

            let ids = self
                .client
                .list_group_members(&self.group_id, offset, self.offset_size)
                .await?;
            if ids.is_empty() {
                continue;
            }

            let profiles = self.client.resolve_users(&ids).await?;
            let models: Vec<UserModel> = profiles
                .into_iter()
                .filter(|profile| profile.is_trackable())
                .map(|profile| UserModel {
                    user_id: profile.id,
                    first_name: profile.first_name,
                    last_name: profile.last_name,
                    status: UserStatus::Unprocessed,
                })
                .collect();

            self.db.user_table.insert_many(&models).await?;
            stored += models.len() as u64;
        }

        let elapsed = start.elapsed();
        info!(
            "Member bootstrap finished: {stored} of {count} members stored in {:.2}s",
            elapsed.as_secs_f64()
        );

        Ok(BootstrapReport {
            members_total: count,
            members_stored: stored,
            pages,
            elapsed,
        })
    }

    /// Always one extra page, even on exact multiples; the final page may
    /// come back empty but is still requested.
    fn page_count(count: u64, offset_size: u64) -> u64 {
        count / offset_size + 1
    }
}
