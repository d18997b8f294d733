use std::str::FromStr;

use log::debug;
use log::info;
use sqlx::Sqlite;
use sqlx::SqlitePool;
use sqlx::Transaction;
use sqlx::sqlite::SqliteConnectOptions;

use crate::database::error::DatabaseError;
use crate::database::table::SubTable;
use crate::database::table::UserSubTable;
use crate::database::table::UserTable;

pub mod error;
pub mod model;
pub mod table;

pub struct Database {
    pub pool: SqlitePool,
    pub user_table: UserTable,
    pub sub_table: SubTable,
    pub user_sub_table: UserSubTable,
}

impl Database {
    pub async fn new(db_url: &str, db_path: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            debug!("Database path {db_path} does not exist. Creating...");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "")?;
            info!("Created {db_path}");
        }

        debug!("Connecting to db...");
        let opts = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(opts).await?;
        info!("Connected to db.");

        let user_table = UserTable::new(pool.clone());
        let sub_table = SubTable::new(pool.clone());
        let user_sub_table = UserSubTable::new(pool.clone());

        Ok(Self {
            pool,
            user_table,
            sub_table,
            user_sub_table,
        })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// One transaction per unit of work (a member page, a crawled user).
    /// Dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, DatabaseError> {
        Ok(self.pool.begin().await?)
    }
}
