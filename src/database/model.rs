use serde::Serialize;
use sqlx::FromRow;

/// Per-user crawl progress marker. Transitions only `Unprocessed -> Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[repr(i32)]
pub enum UserStatus {
    Unprocessed = 0,
    Processed = 1,
}

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct UserModel {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub status: UserStatus,
}

impl Default for UserModel {
    fn default() -> Self {
        Self {
            user_id: 0,
            first_name: String::new(),
            last_name: String::new(),
            status: UserStatus::Unprocessed,
        }
    }
}

#[derive(FromRow, Debug, Clone, Serialize, Default)]
pub struct SubModel {
    pub sub_id: i64,
    pub sub_name: String,
}

#[derive(FromRow, Debug, Clone, Serialize, Default)]
pub struct UserSubModel {
    pub user_id: i64,
    pub sub_id: i64,
}
