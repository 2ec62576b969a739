//! Landlord profile service.

use chrono::Utc;
use renthub_common::{AppError, AppResult, IdGenerator};
use renthub_db::{entities::landlord, repositories::LandlordRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for applying for landlord status.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyLandlordInput {
    #[validate(length(min = 1, max = 50))]
    pub real_name: String,

    #[validate(length(min = 1, max = 18))]
    pub id_number: String,

    #[validate(length(min = 1, max = 20))]
    pub phone_number: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub address: String,

    #[validate(length(max = 2048))]
    #[serde(default)]
    pub introduction: String,
}

/// Landlord service for profile management.
#[derive(Clone)]
pub struct LandlordService {
    repo: LandlordRepository,
    id_gen: IdGenerator,
}

impl LandlordService {
    /// Create a new landlord service.
    #[must_use]
    pub const fn new(repo: LandlordRepository) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply for a landlord profile. One profile per user.
    pub async fn apply(
        &self,
        user_id: &str,
        input: ApplyLandlordInput,
    ) -> AppResult<landlord::Model> {
        input.validate()?;

        if self.repo.find_by_user(user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Landlord profile already exists".to_string(),
            ));
        }

        let model = landlord::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            real_name: Set(input.real_name),
            id_number: Set(input.id_number),
            phone_number: Set(input.phone_number),
            address: Set(input.address),
            verified: Set(false),
            introduction: Set(input.introduction),
            rating: Set(5.0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.repo.create(model).await
    }

    /// Fetch the profile belonging to a user.
    pub async fn get_by_user(&self, user_id: &str) -> AppResult<landlord::Model> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Landlord profile for user {user_id}")))
    }

    /// Fetch a profile by id.
    pub async fn get_by_id(&self, id: &str) -> AppResult<landlord::Model> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Landlord {id}")))
    }

    /// Mark a profile verified.
    pub async fn verify(&self, id: &str) -> AppResult<()> {
        if !self.repo.set_verified(id).await? {
            return Err(AppError::NotFound(format!("Landlord {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_landlord(id: &str, user_id: &str) -> landlord::Model {
        landlord::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            real_name: "Pat Doe".to_string(),
            id_number: "110101199001010011".to_string(),
            phone_number: "555-0100".to_string(),
            address: String::new(),
            verified: false,
            introduction: String::new(),
            rating: 5.0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> LandlordService {
        LandlordService::new(LandlordRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts() {
        let existing = test_landlord("l1", "u1");

        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let result = service(db)
            .apply(
                "u1",
                ApplyLandlordInput {
                    real_name: "Pat Doe".to_string(),
                    id_number: "110101199001010011".to_string(),
                    phone_number: "555-0100".to_string(),
                    address: String::new(),
                    introduction: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_verify_missing_profile() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);

        let result = service(db).verify("ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
