use bson::{DateTime, Document, doc, oid::ObjectId};
use esshub_db::models::{AttendanceRequest, Employee};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

/// Mutable fields of an attendance request, shared by create and update.
#[derive(Debug, Clone)]
pub struct AttendanceRequestInput {
    pub company: String,
    pub from_date: String,
    pub to_date: String,
    pub reason: String,
    pub half_day: bool,
    pub half_day_date: Option<String>,
    pub include_holidays: bool,
    pub shift: Option<String>,
    pub explanation: Option<String>,
}

pub struct AttendanceRequestDao {
    pub base: BaseDao<AttendanceRequest>,
}

impl AttendanceRequestDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, AttendanceRequest::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        employee: &Employee,
        input: AttendanceRequestInput,
    ) -> DaoResult<AttendanceRequest> {
        let now = DateTime::now();
        let request = AttendanceRequest {
            id: None,
            employee: employee.id.ok_or(DaoError::NotFound)?,
            employee_name: employee.employee_name.clone(),
            department: employee.department.clone(),
            company: input.company,
            from_date: input.from_date,
            to_date: input.to_date,
            half_day: input.half_day,
            half_day_date: input.half_day_date,
            include_holidays: input.include_holidays,
            shift: input.shift,
            reason: input.reason,
            explanation: input.explanation,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&request).await?;
        self.base.find_by_id(id).await
    }

    /// Updates a request in place. The caller has already checked ownership.
    pub async fn update(
        &self,
        id: ObjectId,
        input: AttendanceRequestInput,
    ) -> DaoResult<bool> {
        let mut set = doc! {
            "company": input.company,
            "from_date": input.from_date,
            "to_date": input.to_date,
            "reason": input.reason,
            "half_day": input.half_day,
            "include_holidays": input.include_holidays,
        };
        set_optional(&mut set, "half_day_date", input.half_day_date);
        set_optional(&mut set, "shift", input.shift);
        set_optional(&mut set, "explanation", input.explanation);

        self.base.update_by_id(id, doc! { "$set": set }).await
    }

    pub async fn find_for_employee(
        &self,
        employee_id: ObjectId,
    ) -> DaoResult<Vec<AttendanceRequest>> {
        self.base
            .find_many(
                doc! { "employee": employee_id },
                Some(doc! { "from_date": -1 }),
            )
            .await
    }

    pub async fn find_owned(
        &self,
        id: ObjectId,
        employee_id: ObjectId,
    ) -> DaoResult<Option<AttendanceRequest>> {
        self.base
            .find_one(doc! { "_id": id, "employee": employee_id })
            .await
    }

    /// Force delete by id, no ownership filter. The route layer applies
    /// whatever permission gate the deployment configures.
    pub async fn force_delete(&self, id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(id).await
    }
}

fn set_optional(set: &mut Document, key: &str, value: Option<String>) {
    match value {
        Some(v) => {
            set.insert(key, v);
        }
        None => {
            set.insert(key, bson::Bson::Null);
        }
    }
}
