//! Viewing appointment service.
//!
//! Enforces the booking lifecycle (`Pending -> Confirmed -> Completed`, with
//! cancellation out of either non-terminal state) and the actor rules: only
//! the owning landlord confirms or completes, only the requester or the
//! landlord cancels. Transitions are compare-and-swap updates at the store,
//! so two racing calls against the same appointment cannot both succeed.

use chrono::Utc;
use renthub_common::{AppError, AppResult, IdGenerator};
use renthub_db::{
    entities::viewing::{self, ViewingStatus},
    repositories::ViewingRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::house::HouseService;

/// Reason recorded when a cancellation arrives without one.
const DEFAULT_CANCEL_REASON: &str = "user cancelled";

/// Input for booking a viewing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateViewingInput {
    pub house_id: String,

    /// Requested time; must be strictly in the future.
    pub viewing_time: chrono::DateTime<chrono::FixedOffset>,

    #[validate(length(max = 1024))]
    #[serde(default)]
    pub remark: String,

    #[validate(length(min = 1, max = 50))]
    pub contact_name: String,

    #[validate(length(min = 1, max = 20))]
    pub contact_phone: String,
}

/// Viewing service: the appointment lifecycle state machine.
#[derive(Clone)]
pub struct ViewingService {
    repo: ViewingRepository,
    houses: HouseService,
    id_gen: IdGenerator,
}

impl ViewingService {
    /// Create a new viewing service.
    #[must_use]
    pub fn new(repo: ViewingRepository, houses: HouseService) -> Self {
        Self {
            repo,
            houses,
            id_gen: IdGenerator::new(),
        }
    }

    /// Book a viewing. The requester becomes the appointment's owner and the
    /// appointment starts out `Pending`.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateViewingInput,
    ) -> AppResult<viewing::Model> {
        input.validate()?;

        let now = Utc::now();
        if input.viewing_time <= now {
            return Err(AppError::Validation(
                "Viewing time must be in the future".to_string(),
            ));
        }

        // The house must exist; slight staleness of the cached copy is fine.
        self.houses.get_by_id(&input.house_id).await?;

        let model = viewing::ActiveModel {
            id: Set(self.id_gen.generate()),
            house_id: Set(input.house_id),
            user_id: Set(user_id.to_string()),
            viewing_time: Set(input.viewing_time),
            status: Set(ViewingStatus::Pending),
            remark: Set(input.remark),
            contact_name: Set(input.contact_name),
            contact_phone: Set(input.contact_phone),
            confirm_time: Set(None),
            cancel_time: Set(None),
            cancel_reason: Set(None),
            created_at: Set(now.into()),
        };

        self.repo.create(model).await
    }

    /// Fetch one appointment; visible to its requester and the landlord.
    pub async fn get(&self, actor_id: &str, id: &str) -> AppResult<viewing::Model> {
        let viewing = self.load(id).await?;
        if viewing.user_id != actor_id {
            self.require_landlord(actor_id, &viewing.house_id).await?;
        }
        Ok(viewing)
    }

    /// Appointments requested by the acting user.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<viewing::Model>> {
        self.repo.find_by_user(user_id).await
    }

    /// Appointments booked against a house; landlord only.
    pub async fn list_by_house(
        &self,
        actor_id: &str,
        house_id: &str,
    ) -> AppResult<Vec<viewing::Model>> {
        self.require_landlord(actor_id, house_id).await?;
        self.repo.find_by_house(house_id).await
    }

    /// Pending -> Confirmed, by the owning landlord.
    pub async fn confirm(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let viewing = self.load(id).await?;
        self.require_landlord(actor_id, &viewing.house_id).await?;

        if viewing.status != ViewingStatus::Pending {
            return Err(invalid_transition(viewing.status, "confirm"));
        }

        // Re-checked at the store; a raced transition loses here.
        if !self.repo.confirm_pending(id, Utc::now().into()).await? {
            return Err(raced_transition("confirm"));
        }
        Ok(())
    }

    /// Confirmed -> Completed, by the owning landlord.
    pub async fn complete(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let viewing = self.load(id).await?;
        self.require_landlord(actor_id, &viewing.house_id).await?;

        if viewing.status != ViewingStatus::Confirmed {
            return Err(invalid_transition(viewing.status, "complete"));
        }

        if !self.repo.complete_confirmed(id).await? {
            return Err(raced_transition("complete"));
        }
        Ok(())
    }

    /// {Pending, Confirmed} -> Cancelled, by the requester or the landlord.
    pub async fn cancel(
        &self,
        actor_id: &str,
        id: &str,
        reason: Option<String>,
    ) -> AppResult<()> {
        let viewing = self.load(id).await?;

        if viewing.user_id != actor_id {
            self.require_landlord(actor_id, &viewing.house_id).await?;
        }

        if !viewing.status.is_cancellable() {
            return Err(invalid_transition(viewing.status, "cancel"));
        }

        let reason = reason
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());

        if !self.repo.cancel_active(id, Utc::now().into(), &reason).await? {
            return Err(raced_transition("cancel"));
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> AppResult<viewing::Model> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ViewingNotFound(id.to_string()))
    }

    /// Resolve the house's landlord and require it to be the actor.
    async fn require_landlord(&self, actor_id: &str, house_id: &str) -> AppResult<()> {
        let house = self.houses.get_by_id(house_id).await?;
        if house.landlord_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the house's landlord may do this".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid_transition(from: ViewingStatus, op: &str) -> AppError {
    AppError::InvalidState(format!("Cannot {op} a viewing in state {from:?}"))
}

fn raced_transition(op: &str) -> AppError {
    AppError::InvalidState(format!(
        "Cannot {op}: the viewing was transitioned concurrently"
    ))
}
