use async_trait::async_trait;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;

use super::BaseTable;
use super::Table;
use crate::database::error::DatabaseError;
use crate::database::model::UserModel;
use crate::database::model::UserStatus;

pub struct UserTable {
    base: BaseTable,
}

impl UserTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseTable::new(pool),
        }
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count as u64)
    }

    pub async fn count_by_status(&self, status: UserStatus) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE status = ?")
            .bind(status)
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count as u64)
    }

    /// Inserts one page of members within a single transaction.
    pub async fn insert_many(&self, models: &[UserModel]) -> Result<(), DatabaseError> {
        let mut tx = self.base.pool.begin().await?;
        for model in models {
            sqlx::query(
                "INSERT INTO users (user_id, first_name, last_name, status) VALUES (?, ?, ?, ?)",
            )
            .bind(model.user_id)
            .bind(&model.first_name)
            .bind(&model.last_name)
            .bind(model.status)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Users still waiting for the subscription crawl, lowest ID first.
    pub async fn select_unprocessed(&self, limit: u64) -> Result<Vec<UserModel>, DatabaseError> {
        let ret = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT user_id, first_name, last_name, status
            FROM users
            WHERE status = ?
            ORDER BY user_id
            LIMIT ?
            "#,
        )
        .bind(UserStatus::Unprocessed)
        .bind(limit as i64)
        .fetch_all(&self.base.pool)
        .await?;
        Ok(ret)
    }

    /// Idempotent: repeating the same status write is a no-op.
    pub async fn set_status(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        status: UserStatus,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET status = ? WHERE user_id = ?")
            .bind(status)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Table<UserModel, i64> for UserTable {
    async fn select_all(&self) -> Result<Vec<UserModel>, DatabaseError> {
        let ret = sqlx::query_as::<_, UserModel>(
            "SELECT user_id, first_name, last_name, status FROM users",
        )
        .fetch_all(&self.base.pool)
        .await?;
        Ok(ret)
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, model: &UserModel) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (user_id, first_name, last_name, status) VALUES (?, ?, ?, ?)",
        )
        .bind(model.user_id)
        .bind(&model.first_name)
        .bind(&model.last_name)
        .bind(model.status)
        .execute(&self.base.pool)
        .await?;
        Ok(())
    }

    async fn select(&self, id: &i64) -> Result<Option<UserModel>, DatabaseError> {
        let model = sqlx::query_as::<_, UserModel>(
            "SELECT user_id, first_name, last_name, status FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.base.pool)
        .await?;
        Ok(model)
    }

    async fn delete(&self, id: &i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}
