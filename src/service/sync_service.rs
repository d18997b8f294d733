//! Top-level sync: member bootstrap plus the resumable subscription crawl.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use log::warn;

use crate::config::Config;
use crate::config::CrawlPolicy;
use crate::database::Database;
use crate::database::error::DatabaseError;
use crate::database::model::SubModel;
use crate::database::model::UserModel;
use crate::database::model::UserStatus;
use crate::database::model::UserSubModel;
use crate::database::table::Table;
use crate::service::error::ServiceError;
use crate::service::member_service::BootstrapReport;
use crate::service::member_service::MemberSyncService;
use crate::vk::SubscriptionResolver;

/// Orchestrates one run: bootstrap the member list if the store is empty,
/// then crawl subscriptions for a batch of unprocessed users.
pub struct SyncService {
    db: Arc<Database>,
    members: MemberSyncService,
    resolver: SubscriptionResolver,
    user_limit: u64,
    policy: CrawlPolicy,
}

/// Counters of one crawl batch.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub processed: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub remaining: u64,
}

#[derive(Debug)]
pub struct SyncReport {
    pub bootstrap: Option<BootstrapReport>,
    pub crawl: CrawlReport,
}

/// What happened to one crawled user.
enum UserOutcome {
    /// Subscriptions stored, status now `Processed`.
    Processed,
    /// Zero resolvable subscriptions: the user row was removed.
    Deleted,
}

impl SyncService {
    pub fn new(
        db: Arc<Database>,
        members: MemberSyncService,
        resolver: SubscriptionResolver,
        config: &Config,
    ) -> Self {
        Self {
            db,
            members,
            resolver,
            user_limit: config.user_limit,
            policy: config.crawl_policy,
        }
    }

    /// Runs one sync pass. The bootstrap check is solely "user table is
    /// empty" - a store with any users at all goes straight to the crawl.
    pub async fn run(&self) -> Result<SyncReport, ServiceError> {
        let bootstrap = if self.db.user_table.count().await? == 0 {
            info!("User table is empty, running member bootstrap");
            Some(self.members.bootstrap().await?)
        } else {
            None
        };

        let crawl = self.crawl_batch().await?;
        Ok(SyncReport { bootstrap, crawl })
    }

    /// Crawls up to `user_limit` unprocessed users. Re-running with nothing
    /// left to do is a no-op that reports zero processed.
    pub async fn crawl_batch(&self) -> Result<CrawlReport, ServiceError> {
        let total_users = self.db.user_table.count().await?;
        let processed_before = self
            .db
            .user_table
            .count_by_status(UserStatus::Processed)
            .await?;
        let total_subs = self.db.sub_table.count().await?;
        let queue = self.db.user_table.select_unprocessed(self.user_limit).await?;

        info!("Subs: total {total_subs}");
        info!(
            "Users: total {total_users}, processed {processed_before}, batch limit {}, queue {}",
            self.user_limit,
            queue.len()
        );

        let start = Instant::now();
        let mut report = CrawlReport::default();

        for (i, user) in queue.iter().enumerate() {
            info!(
                "Receiving subscriptions {}/{total_users} (user {}, {}s elapsed)",
                processed_before + i as u64 + 1,
                user.user_id,
                start.elapsed().as_secs()
            );

            match self.process_user(user).await {
                Ok(UserOutcome::Processed) => report.processed += 1,
                Ok(UserOutcome::Deleted) => report.deleted += 1,
                Err(err) => match self.policy {
                    CrawlPolicy::HaltOnError => return Err(err),
                    CrawlPolicy::SkipAndContinue => {
                        warn!("Skipping user {}: {err}", user.user_id);
                        report.skipped += 1;
                    }
                },
            }
        }

        report.remaining = self
            .db
            .user_table
            .count_by_status(UserStatus::Unprocessed)
            .await?;
        if report.remaining == 0 {
            info!("Crawl complete, no unprocessed users remain.");
        }

        Ok(report)
    }

    /// One user, one transaction: upsert each community, link it, and mark
    /// the user processed. The status write repeats per pair and stays
    /// idempotent.
    async fn process_user(&self, user: &UserModel) -> Result<UserOutcome, ServiceError> {
        let groups = self.resolver.resolve(user.user_id).await?;

        if groups.is_empty() {
            // A member with zero trackable subscriptions is not worth
            // retaining; never marked processed since the row is gone.
            self.db.user_table.delete(&user.user_id).await?;
            info!("User {} has no subscriptions, removed", user.user_id);
            return Ok(UserOutcome::Deleted);
        }

        let mut tx = self.db.begin().await?;
        for group in &groups {
            let sub = SubModel {
                sub_id: group.id,
                sub_name: group.name.clone(),
            };
            self.db.sub_table.insert_if_absent(&mut *tx, &sub).await?;
            self.db
                .user_sub_table
                .insert_if_absent(
                    &mut *tx,
                    &UserSubModel {
                        user_id: user.user_id,
                        sub_id: group.id,
                    },
                )
                .await?;
            self.db
                .user_table
                .set_status(&mut *tx, user.user_id, UserStatus::Processed)
                .await?;
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(UserOutcome::Processed)
    }
}
