use async_trait::async_trait;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;

use super::BaseTable;
use super::Table;
use crate::database::error::DatabaseError;
use crate::database::model::UserSubModel;

pub struct UserSubTable {
    base: BaseTable,
}

impl UserSubTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseTable::new(pool),
        }
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users_subs")
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count as u64)
    }

    pub async fn count_by_user(&self, user_id: i64) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users_subs WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count as u64)
    }

    /// Duplicate pairs left over from an interrupted run are absorbed here.
    pub async fn insert_if_absent(
        &self,
        conn: &mut SqliteConnection,
        model: &UserSubModel,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT OR IGNORE INTO users_subs (user_id, sub_id) VALUES (?, ?)")
            .bind(model.user_id)
            .bind(model.sub_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Table<UserSubModel, (i64, i64)> for UserSubTable {
    async fn select_all(&self) -> Result<Vec<UserSubModel>, DatabaseError> {
        let ret = sqlx::query_as::<_, UserSubModel>("SELECT user_id, sub_id FROM users_subs")
            .fetch_all(&self.base.pool)
            .await?;
        Ok(ret)
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users_subs")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, model: &UserSubModel) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO users_subs (user_id, sub_id) VALUES (?, ?)")
            .bind(model.user_id)
            .bind(model.sub_id)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn select(&self, id: &(i64, i64)) -> Result<Option<UserSubModel>, DatabaseError> {
        let model = sqlx::query_as::<_, UserSubModel>(
            "SELECT user_id, sub_id FROM users_subs WHERE user_id = ? AND sub_id = ?",
        )
        .bind(id.0)
        .bind(id.1)
        .fetch_optional(&self.base.pool)
        .await?;
        Ok(model)
    }

    async fn delete(&self, id: &(i64, i64)) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users_subs WHERE user_id = ? AND sub_id = ?")
            .bind(id.0)
            .bind(id.1)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}
