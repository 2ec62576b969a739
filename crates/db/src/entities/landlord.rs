//! Landlord profile entity.
//!
//! One profile per user. House ownership is expressed by
//! `house.landlord_id` holding the owning user's id; this profile carries the
//! identity-verification data a landlord submits before listing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "landlord")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning user
    #[sea_orm(unique)]
    pub user_id: String,

    /// Legal name
    pub real_name: String,

    /// Government ID number
    pub id_number: String,

    /// Contact phone
    pub phone_number: String,

    /// Contact address
    pub address: String,

    /// Identity verified by an operator
    #[sea_orm(default_value = false)]
    pub verified: bool,

    /// Self-introduction shown on listings
    #[sea_orm(column_type = "Text")]
    pub introduction: String,

    /// Aggregate rating
    #[sea_orm(default_value = 5.0)]
    pub rating: f64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
