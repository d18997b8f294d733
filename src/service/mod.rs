use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::service::member_service::MemberSyncService;
use crate::service::sync_service::SyncService;
use crate::vk::SubscriptionResolver;
use crate::vk::VkClient;

pub mod error;
pub mod member_service;
pub mod sync_service;

pub struct Services {
    pub sync: Arc<SyncService>,
}

impl Services {
    pub fn new(db: Arc<Database>, client: Arc<VkClient>, config: &Config) -> Self {
        let members = MemberSyncService::new(db.clone(), client.clone(), config);
        let resolver = SubscriptionResolver::new(client, config.sub_limit);

        Self {
            sync: Arc::new(SyncService::new(db, members, resolver, config)),
        }
    }
}
