pub mod sub_table;
pub mod user_sub_table;
pub mod user_table;

pub use sub_table::SubTable;
pub use user_sub_table::UserSubTable;
pub use user_table::UserTable;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::error::DatabaseError;

pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
pub trait Table<T, ID> {
    async fn select_all(&self) -> Result<Vec<T>, DatabaseError>;
    async fn delete_all(&self) -> Result<(), DatabaseError>;
    async fn insert(&self, model: &T) -> Result<(), DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    async fn delete(&self, id: &ID) -> Result<(), DatabaseError>;
}
