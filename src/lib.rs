//! vk-harvest - incremental VK group member and subscription harvester.
//!
//! Two-stage pipeline against the VK API:
//! - a one-time bootstrap that enumerates every member of a configured group
//!   (run only while the user table is empty), and
//! - a resumable, batch-limited crawl that resolves each member's community
//!   subscriptions, driven by a persisted per-user status flag.
//!
//! Everything is persisted into SQLite so a run can be interrupted and
//! resumed without re-fetching already-processed users.

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod service;
pub mod vk;
