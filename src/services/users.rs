use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, AuthError, AuthService},
    db::DbPool,
    entities::user::{self, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Public view of an account; the password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            role: model.role,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// Body of `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 64, message = "username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6 to 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "fullName must not be empty"))]
    pub full_name: String,
    pub role: Option<UserRole>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
}

/// Body of `POST /api/login`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    /// Accepted for compatibility with older clients and ignored
    pub role: Option<String>,
}

/// Successful login: the user fields plus a session token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Accounts and sign-in
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, auth: Arc<AuthService>) -> Self {
        Self {
            db_pool,
            event_sender,
            auth,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ServiceError> {
        let db = &*self.db_pool;
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<UserProfile, ServiceError> {
        let db = &*self.db_pool;
        user::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(UserProfile::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        let db = &*self.db_pool;
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Looks an account up by login name
    #[instrument(skip(self))]
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, ServiceError> {
        Ok(self.find_by_username(username).await?.map(UserProfile::from))
    }

    /// Whether any account exists yet
    pub async fn has_users(&self) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        Ok(user::Entity::find()
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .is_some())
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<UserProfile, ServiceError> {
        input.validate()?;

        if self.find_by_username(&input.username).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password = hash_password(&input.password)?;
        let model = user::ActiveModel {
            username: Set(input.username.clone()),
            password: Set(password),
            full_name: Set(input.full_name),
            role: Set(input.role.unwrap_or_default()),
            email: Set(input.email),
            ..Default::default()
        };

        let db = &*self.db_pool;
        let created = model.insert(db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict(format!("Username '{}' is already taken", input.username))
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(user_id = created.id, role = created.role.as_str(), "user created");
        self.event_sender
            .send_or_log(Event::UserCreated(created.id))
            .await;
        Ok(created.into())
    }

    /// Verifies credentials and issues a session token. Unknown users and wrong passwords
    /// are indistinguishable to the caller.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginResponse, ServiceError> {
        input.validate()?;

        let Some(account) = self.find_by_username(&input.username).await? else {
            warn!("login failed: unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(&input.password, &account.password)? {
            warn!(user_id = account.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self.auth.generate_token(&account)?;
        info!(user_id = account.id, "login succeeded");

        Ok(LoginResponse {
            user: account.into(),
            token: issued.access_token,
            token_type: issued.token_type,
            expires_in: issued.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn profile_serialization_has_no_password() {
        let model = user::Model {
            id: 1,
            username: "admin".into(),
            password: "$argon2id$secret".into(),
            full_name: "Admin".into(),
            role: UserRole::Admin,
            email: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserProfile::from(model)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Admin");
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn login_input_tolerates_role() {
        let input: LoginInput =
            serde_json::from_str(r#"{"username": "a", "password": "b", "role": "admin"}"#).unwrap();
        assert_eq!(input.role.as_deref(), Some("admin"));
    }

    #[test]
    fn short_password_is_rejected() {
        let input = CreateUserInput {
            username: "kitchen".into(),
            password: "123".into(),
            full_name: "Kitchen".into(),
            role: None,
            email: None,
        };
        let err = ServiceError::from(input.validate().unwrap_err());
        assert_matches!(err, ServiceError::InvalidField { ref field, .. } if field == "password");
    }
}
