use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;
use vk_harvest::config::Config;
use vk_harvest::database::Database;
use vk_harvest::vk::VkClient;

#[allow(dead_code)]
pub async fn setup_db() -> (Arc<Database>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("vk-harvest-test-{uuid}.db"));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Database::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

#[allow(dead_code)]
pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

/// Config pointed at a mock server, with a rate limit that stays out of the way.
#[allow(dead_code)]
pub fn test_config(api_url: &str) -> Config {
    Config {
        access_token: "token".to_string(),
        group_id: "1".to_string(),
        api_url: api_url.to_string(),
        api_rps: 1000,
        ..Config::default()
    }
}

/// Client with a near-zero backoff unit so retry tests finish quickly.
#[allow(dead_code)]
pub fn test_client(config: &Config) -> VkClient {
    let mut client = VkClient::new(config);
    client.backoff_unit = Duration::from_millis(1);
    client
}

#[allow(dead_code)]
pub fn join_ids(ids: impl IntoIterator<Item = i64>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
