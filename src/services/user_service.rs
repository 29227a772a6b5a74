use async_trait::async_trait;
use bcrypt::{hash, DEFAULT_COST};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::entities::{users, UserRole};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::task_import::UserStore;

/// Create/update payload. On update a missing or empty password keeps the stored hash.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub division_id: Option<i32>,
    #[serde(default)]
    pub block: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<users::Model>> {
        debug!("Fetching all users");
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<users::Model> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    pub async fn get_by_email(&self, email: &str) -> ServiceResult<Option<users::Model>> {
        debug!("Fetching user by email: {}", email);
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn list_by_division(&self, division_id: i32) -> ServiceResult<Vec<users::Model>> {
        debug!("Fetching users by division: {}", division_id);
        let users = users::Entity::find()
            .filter(users::Column::DivisionId.eq(division_id))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn list_by_role(&self, role: UserRole) -> ServiceResult<Vec<users::Model>> {
        debug!("Fetching users by role: {}", role);
        let users = users::Entity::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    /// Like [`Self::get_by_email`] but a missing user is an error
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<users::Model> {
        self.get_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFoundByKey {
                entity: "User",
                key: email.trim().to_string(),
            })
    }

    pub async fn search_by_name(&self, name: &str) -> ServiceResult<Vec<users::Model>> {
        debug!("Searching users by name: {}", name);
        let users = users::Entity::find()
            .filter(users::Column::Name.contains(name))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn list_by_division_and_role(
        &self,
        division_id: i32,
        role: UserRole,
    ) -> ServiceResult<Vec<users::Model>> {
        debug!("Fetching users by division {} and role {}", division_id, role);
        let users = users::Entity::find()
            .filter(users::Column::DivisionId.eq(division_id))
            .filter(users::Column::Role.eq(role.as_str()))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn count_by_division(&self, division_id: i32) -> ServiceResult<u64> {
        let count = users::Entity::find()
            .filter(users::Column::DivisionId.eq(division_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, input: UserInput) -> ServiceResult<users::Model> {
        let (name, email) = validate_identity(&input)?;
        info!("Creating new user: {}", email);

        if self.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let password = match input.password.as_deref() {
            Some(password) if !password.is_empty() => password,
            _ => return Err(ServiceError::Validation("Password is required".to_string())),
        };

        let mut user = users::ActiveModel::new();
        user.name = Set(name);
        user.email = Set(email);
        user.password_hash = Set(hash(password, DEFAULT_COST)?);
        user.role = Set(input.role.unwrap_or(UserRole::Employee).to_string());
        user.division_id = Set(input.division_id);
        user.block = Set(input.block);
        Ok(user.insert(&self.db).await?)
    }

    pub async fn update(&self, id: i32, input: UserInput) -> ServiceResult<users::Model> {
        let (name, email) = validate_identity(&input)?;
        info!("Updating user with id: {}", id);

        let existing = self.get(id).await?;
        if let Some(other) = self.get_by_email(&email).await? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!(
                    "User with email {} already exists",
                    email
                )));
            }
        }

        let role = input
            .role
            .or_else(|| existing.get_role())
            .unwrap_or(UserRole::Employee);

        let mut user: users::ActiveModel = existing.into();
        user.name = Set(name);
        user.email = Set(email);
        user.role = Set(role.to_string());
        user.division_id = Set(input.division_id);
        user.block = Set(input.block);
        if let Some(password) = input.password.as_deref().filter(|p| !p.is_empty()) {
            user.password_hash = Set(hash(password, DEFAULT_COST)?);
        }
        Ok(user.set_updated_at().update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting user with id: {}", id);
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("User", id));
        }
        Ok(())
    }
}

fn validate_identity(input: &UserInput) -> ServiceResult<(String, String)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("User name is required".to_string()));
    }
    let email = input.email.trim();
    if !email.contains('@') {
        return Err(ServiceError::Validation(format!("Invalid email: {}", email)));
    }
    Ok((name.to_string(), email.to_string()))
}

#[async_trait]
impl UserStore for UserService {
    async fn find_by_division_id(&self, division_id: i32) -> ServiceResult<Vec<users::Model>> {
        self.list_by_division(division_id).await
    }
}
