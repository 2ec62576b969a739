//! Landlord profile repository.

use std::sync::Arc;

use crate::entities::{Landlord, landlord};
use renthub_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Landlord repository for database operations.
#[derive(Clone)]
pub struct LandlordRepository {
    db: Arc<DatabaseConnection>,
}

impl LandlordRepository {
    /// Create a new landlord repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new landlord profile.
    pub async fn create(&self, model: landlord::ActiveModel) -> AppResult<landlord::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<landlord::Model>> {
        Landlord::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the profile belonging to a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<landlord::Model>> {
        Landlord::find()
            .filter(landlord::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a profile verified. Returns `false` if no such profile exists.
    pub async fn set_verified(&self, id: &str) -> AppResult<bool> {
        let result = Landlord::update_many()
            .col_expr(landlord::Column::Verified, Expr::value(true))
            .filter(landlord::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
