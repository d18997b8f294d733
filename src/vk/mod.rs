//! VK API integration: rate-limited client and subscription resolution.

pub mod client;
pub mod error;
pub mod model;
pub mod subscriptions;

pub use client::VkClient;
pub use subscriptions::SubscriptionResolver;
