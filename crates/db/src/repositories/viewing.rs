//! Viewing repository.
//!
//! State transitions execute as single conditional UPDATE statements keyed on
//! the current status, so two racing transitions against the same row cannot
//! both succeed, and the timestamp/reason columns move atomically with the
//! status column.

use std::sync::Arc;

use crate::entities::{
    Viewing,
    viewing::{self, ViewingStatus},
};
use renthub_common::{AppError, AppResult};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Viewing repository for database operations.
#[derive(Clone)]
pub struct ViewingRepository {
    db: Arc<DatabaseConnection>,
}

impl ViewingRepository {
    /// Create a new viewing repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new viewing.
    pub async fn create(&self, model: viewing::ActiveModel) -> AppResult<viewing::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a viewing by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<viewing::Model>> {
        Viewing::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Viewings requested by a user, soonest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<viewing::Model>> {
        Viewing::find()
            .filter(viewing::Column::UserId.eq(user_id))
            .order_by_asc(viewing::Column::ViewingTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Viewings booked against a house, soonest first.
    pub async fn find_by_house(&self, house_id: &str) -> AppResult<Vec<viewing::Model>> {
        Viewing::find()
            .filter(viewing::Column::HouseId.eq(house_id))
            .order_by_asc(viewing::Column::ViewingTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending -> Confirmed, stamping `confirm_time` in the same statement.
    ///
    /// Returns `false` when the row was no longer `Pending` (a concurrent
    /// transition won).
    pub async fn confirm_pending(
        &self,
        id: &str,
        now: DateTimeWithTimeZone,
    ) -> AppResult<bool> {
        let result = Viewing::update_many()
            .col_expr(viewing::Column::Status, Expr::value(ViewingStatus::Confirmed))
            .col_expr(viewing::Column::ConfirmTime, Expr::value(Some(now)))
            .filter(viewing::Column::Id.eq(id))
            .filter(viewing::Column::Status.eq(ViewingStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Confirmed -> Completed.
    ///
    /// Returns `false` when the row was no longer `Confirmed`.
    pub async fn complete_confirmed(&self, id: &str) -> AppResult<bool> {
        let result = Viewing::update_many()
            .col_expr(viewing::Column::Status, Expr::value(ViewingStatus::Completed))
            .filter(viewing::Column::Id.eq(id))
            .filter(viewing::Column::Status.eq(ViewingStatus::Confirmed))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// {Pending, Confirmed} -> Cancelled, stamping `cancel_time` and
    /// `cancel_reason` in the same statement.
    ///
    /// Returns `false` when the row was already terminal.
    pub async fn cancel_active(
        &self,
        id: &str,
        now: DateTimeWithTimeZone,
        reason: &str,
    ) -> AppResult<bool> {
        let result = Viewing::update_many()
            .col_expr(viewing::Column::Status, Expr::value(ViewingStatus::Cancelled))
            .col_expr(viewing::Column::CancelTime, Expr::value(Some(now)))
            .col_expr(
                viewing::Column::CancelReason,
                Expr::value(Some(reason.to_string())),
            )
            .filter(viewing::Column::Id.eq(id))
            .filter(
                viewing::Column::Status
                    .is_in([ViewingStatus::Pending, ViewingStatus::Confirmed]),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
