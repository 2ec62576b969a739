//! Viewing (booking request) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a viewing appointment.
///
/// Transitions only move along `Pending -> Confirmed -> Completed`, with
/// `Cancelled` reachable from `Pending` and `Confirmed`. `Completed` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[derive(Default)]
pub enum ViewingStatus {
    /// Awaiting landlord confirmation.
    #[sea_orm(num_value = 0)]
    #[default]
    Pending,
    /// Confirmed by the landlord.
    #[sea_orm(num_value = 1)]
    Confirmed,
    /// The viewing took place.
    #[sea_orm(num_value = 2)]
    Completed,
    /// Cancelled by the requester or the landlord.
    #[sea_orm(num_value = 3)]
    Cancelled,
}

impl ViewingStatus {
    /// Whether no further transitions are defined from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the appointment can still be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "viewing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// House being viewed
    #[sea_orm(indexed)]
    pub house_id: String,

    /// Requesting tenant
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Scheduled time of the viewing
    pub viewing_time: DateTimeWithTimeZone,

    /// Lifecycle state
    pub status: ViewingStatus,

    /// Free-text note from the requester
    #[sea_orm(column_type = "Text")]
    pub remark: String,

    /// Contact name
    pub contact_name: String,

    /// Contact phone
    pub contact_phone: String,

    /// Set exactly once, on the Pending -> Confirmed edge
    #[sea_orm(nullable)]
    pub confirm_time: Option<DateTimeWithTimeZone>,

    /// Set exactly once, on entry to Cancelled
    #[sea_orm(nullable)]
    pub cancel_time: Option<DateTimeWithTimeZone>,

    /// Set exactly once, on entry to Cancelled
    #[sea_orm(column_type = "Text", nullable)]
    pub cancel_reason: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::house::Entity",
        from = "Column::HouseId",
        to = "super::house::Column::Id"
    )]
    House,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::house::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::House.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ViewingStatus::Pending.is_terminal());
        assert!(!ViewingStatus::Confirmed.is_terminal());
        assert!(ViewingStatus::Completed.is_terminal());
        assert!(ViewingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_cancellable_states() {
        assert!(ViewingStatus::Pending.is_cancellable());
        assert!(ViewingStatus::Confirmed.is_cancellable());
        assert!(!ViewingStatus::Completed.is_cancellable());
        assert!(!ViewingStatus::Cancelled.is_cancellable());
    }
}
