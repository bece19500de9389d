use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{employee, user},
    errors::ServiceError,
    events::{Event, EventSender},
    services::users::UserProfile,
};

/// Body of `POST /api/employees`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeInput {
    pub user_id: i32,
    #[validate(range(min = 0, message = "salary must not be negative"))]
    pub salary: Option<i64>,
    #[validate(length(max = 64))]
    pub shift: Option<String>,
    #[validate(length(max = 16))]
    pub performance: Option<String>,
}

/// Employee record with its account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithUser {
    #[serde(flatten)]
    pub employee: employee::Model,
    pub user: Option<UserProfile>,
}

impl From<(employee::Model, Option<user::Model>)> for EmployeeWithUser {
    fn from((employee, user): (employee::Model, Option<user::Model>)) -> Self {
        Self {
            employee,
            user: user.map(UserProfile::from),
        }
    }
}

#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_employees(&self) -> Result<Vec<EmployeeWithUser>, ServiceError> {
        let db = &*self.db_pool;
        let rows = employee::Entity::find()
            .order_by_asc(employee::Column::Id)
            .find_also_related(user::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(EmployeeWithUser::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_user(&self, user_id: i32) -> Result<EmployeeWithUser, ServiceError> {
        let db = &*self.db_pool;
        employee::Entity::find()
            .filter(employee::Column::UserId.eq(user_id))
            .find_also_related(user::Entity)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(EmployeeWithUser::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No employee record for user {}", user_id))
            })
    }

    /// One employee per user; a second record for the same user is a conflict
    #[instrument(skip(self))]
    pub async fn create_employee(
        &self,
        input: CreateEmployeeInput,
    ) -> Result<EmployeeWithUser, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let account = user::Entity::find_by_id(input.user_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::invalid_field(
                    "userId",
                    format!("User {} does not exist", input.user_id),
                )
            })?;

        let already = employee::Entity::find()
            .filter(employee::Column::UserId.eq(input.user_id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if already.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User {} already has an employee record",
                input.user_id
            )));
        }

        let mut model = employee::ActiveModel {
            user_id: Set(input.user_id),
            shift: Set(input.shift),
            performance: Set(input.performance),
            ..Default::default()
        };
        if let Some(salary) = input.salary {
            model.salary = Set(salary);
        }

        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;
        info!(employee_id = created.id, user_id = created.user_id, "employee created");
        self.event_sender
            .send_or_log(Event::EmployeeCreated {
                employee_id: created.id,
                user_id: created.user_id,
            })
            .await;

        Ok(EmployeeWithUser {
            employee: created,
            user: Some(account.into()),
        })
    }
}
