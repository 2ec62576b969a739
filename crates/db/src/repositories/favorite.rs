//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use renthub_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new favorite.
    pub async fn create(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert unless a favorite for the same `(user, house)` already exists.
    ///
    /// Relies on the composite unique index: a concurrent insert for the same
    /// pair makes this a no-op rather than a duplicate row. Returns whether a
    /// row was actually inserted.
    pub async fn insert_if_absent(&self, model: favorite::ActiveModel) -> AppResult<bool> {
        let result = Favorite::insert(model)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::HouseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Find a favorite by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<favorite::Model>> {
        Favorite::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a favorite by user and house.
    pub async fn find_by_user_and_house(
        &self,
        user_id: &str,
        house_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::HouseId.eq(house_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a house is favorited by a user.
    pub async fn is_favorite(&self, user_id: &str, house_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_house(user_id, house_id)
            .await?
            .is_some())
    }

    /// Delete a favorite by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Favorite::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a favorite by user and house.
    ///
    /// Deleting zero rows is not an error; the count lets the caller tell a
    /// real removal from a no-op.
    pub async fn delete_by_user_and_house(
        &self,
        user_id: &str,
        house_id: &str,
    ) -> AppResult<u64> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::HouseId.eq(house_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Favorites of a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_favorite(id: &str, user_id: &str, house_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            house_id: house_id.to_string(),
            notes: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn active_model(id: &str, user_id: &str, house_id: &str) -> favorite::ActiveModel {
        favorite::ActiveModel {
            id: Set(id.to_string()),
            user_id: Set(user_id.to_string()),
            house_id: Set(house_id.to_string()),
            notes: Set(String::new()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
    }

    #[tokio::test]
    async fn test_is_favorite() {
        let fav = create_test_favorite("fav1", "u1", "h1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(repo.is_favorite("u1", "h1").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_not_favorite() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(!repo.is_favorite("u1", "h1").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_if_absent_conflict_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let inserted = repo
            .insert_if_absent(active_model("fav1", "u1", "h1"))
            .await
            .unwrap();

        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_delete_by_user_and_house_counts_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);

        assert_eq!(repo.delete_by_user_and_house("u1", "h1").await.unwrap(), 1);
        // Deleting an absent pair is a no-op, not an error.
        assert_eq!(repo.delete_by_user_and_house("u1", "h1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let fav1 = create_test_favorite("fav1", "u1", "h1");
        let fav2 = create_test_favorite("fav2", "u1", "h2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav1, fav2]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find_by_user("u1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
