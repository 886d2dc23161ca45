use bson::{DateTime, doc};
use esshub_db::models::ShiftType;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct ShiftTypeDao {
    pub base: BaseDao<ShiftType>,
}

impl ShiftTypeDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ShiftType::COLLECTION),
        }
    }

    pub async fn create(&self, name: String) -> DaoResult<ShiftType> {
        let shift = ShiftType {
            id: None,
            name,
            start_time: None,
            end_time: None,
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&shift).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_names(&self) -> DaoResult<Vec<String>> {
        let values = self
            .base
            .find_values(doc! {}, "name")
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}
