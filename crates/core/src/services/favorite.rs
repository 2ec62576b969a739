//! Favorite service.
//!
//! The toggle is a check-then-act flip, which on its own would race: two
//! concurrent toggles could both observe "absent" and insert twice. The
//! uniqueness guarantee is therefore pushed into the store: the insert leg
//! goes through a conflict-ignoring insert against the `(user_id, house_id)`
//! unique index, and the delete leg is naturally idempotent.

use chrono::Utc;
use renthub_common::{AppError, AppResult, IdGenerator};
use renthub_db::{
    entities::favorite,
    repositories::{FavoriteRepository, HouseRepository},
};
use sea_orm::Set;

/// Favorite service for bookmarked houses.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    house_repo: HouseRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, house_repo: HouseRepository) -> Self {
        Self {
            favorite_repo,
            house_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the favorited state of a house for a user.
    ///
    /// Returns the new state: `true` when the call favorited the house,
    /// `false` when it unfavorited it. Losing either race leaves the pair in
    /// a consistent state: a raced double-insert collapses into one row, a
    /// raced double-delete deletes nothing the second time.
    pub async fn toggle(&self, user_id: &str, house_id: &str, notes: &str) -> AppResult<bool> {
        // Favoriting a nonexistent house is rejected up front.
        self.house_repo
            .find_by_id(house_id)
            .await?
            .ok_or_else(|| AppError::HouseNotFound(house_id.to_string()))?;

        if self.favorite_repo.is_favorite(user_id, house_id).await? {
            self.favorite_repo
                .delete_by_user_and_house(user_id, house_id)
                .await?;
            return Ok(false);
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            house_id: Set(house_id.to_string()),
            notes: Set(notes.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        // A concurrent toggle may have inserted between the check and here;
        // the conflict-ignoring insert makes that a no-op and the pair still
        // ends up favorited.
        self.favorite_repo.insert_if_absent(model).await?;
        Ok(true)
    }

    /// Add a favorite explicitly.
    pub async fn add(
        &self,
        user_id: &str,
        house_id: &str,
        notes: &str,
    ) -> AppResult<favorite::Model> {
        self.house_repo
            .find_by_id(house_id)
            .await?
            .ok_or_else(|| AppError::HouseNotFound(house_id.to_string()))?;

        if let Some(existing) = self
            .favorite_repo
            .find_by_user_and_house(user_id, house_id)
            .await?
        {
            return Ok(existing);
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            house_id: Set(house_id.to_string()),
            notes: Set(notes.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.favorite_repo.create(model).await
    }

    /// Remove a favorite by id; only its owner may remove it.
    pub async fn remove(&self, user_id: &str, id: &str) -> AppResult<()> {
        let favorite = self
            .favorite_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Favorite {id}")))?;

        if favorite.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner may remove a favorite".to_string(),
            ));
        }

        self.favorite_repo.delete(id).await
    }

    /// Whether a house is favorited by a user.
    pub async fn is_favorite(&self, user_id: &str, house_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorite(user_id, house_id).await
    }

    /// All favorites of a user, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        self.favorite_repo.find_by_user(user_id).await
    }
}
