use bson::{DateTime, doc};
use esshub_db::models::Employee;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct EmployeeDao {
    pub base: BaseDao<Employee>,
}

impl EmployeeDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Employee::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        user_id: String,
        employee_name: String,
        department: Option<String>,
        company: String,
    ) -> DaoResult<Employee> {
        let now = DateTime::now();
        let employee = Employee {
            id: None,
            user_id,
            employee_name,
            department,
            company,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&employee).await?;
        self.base.find_by_id(id).await
    }

    /// The employee record for a login email, if exactly one exists.
    pub async fn find_by_user_email(&self, email: &str) -> DaoResult<Option<Employee>> {
        self.base.find_one(doc! { "user_id": email }).await
    }
}
