//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login name
    #[sea_orm(unique)]
    pub username: String,

    /// Contact phone
    pub phone: String,

    /// Argon2 password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    /// Last successful login
    #[sea_orm(nullable)]
    pub last_login: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::house::Entity")]
    Houses,
    #[sea_orm(has_many = "super::viewing::Entity")]
    Viewings,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::house::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Houses.def()
    }
}

impl Related<super::viewing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Viewings.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
