use async_trait::async_trait;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;

use super::BaseTable;
use super::Table;
use crate::database::error::DatabaseError;
use crate::database::model::SubModel;

pub struct SubTable {
    base: BaseTable,
}

impl SubTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseTable::new(pool),
        }
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subs")
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count as u64)
    }

    /// Community names are assumed stable: a repeated insert is a no-op and
    /// never updates the stored name.
    pub async fn insert_if_absent(
        &self,
        conn: &mut SqliteConnection,
        model: &SubModel,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT OR IGNORE INTO subs (sub_id, sub_name) VALUES (?, ?)")
            .bind(model.sub_id)
            .bind(&model.sub_name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Table<SubModel, i64> for SubTable {
    async fn select_all(&self) -> Result<Vec<SubModel>, DatabaseError> {
        let ret = sqlx::query_as::<_, SubModel>("SELECT sub_id, sub_name FROM subs")
            .fetch_all(&self.base.pool)
            .await?;
        Ok(ret)
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM subs")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, model: &SubModel) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO subs (sub_id, sub_name) VALUES (?, ?)")
            .bind(model.sub_id)
            .bind(&model.sub_name)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn select(&self, id: &i64) -> Result<Option<SubModel>, DatabaseError> {
        let model =
            sqlx::query_as::<_, SubModel>("SELECT sub_id, sub_name FROM subs WHERE sub_id = ?")
                .bind(id)
                .fetch_optional(&self.base.pool)
                .await?;
        Ok(model)
    }

    async fn delete(&self, id: &i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM subs WHERE sub_id = ?")
            .bind(id)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}
