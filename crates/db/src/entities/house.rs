//! House (rental listing) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[derive(Default)]
pub enum HouseStatus {
    /// Taken off the market.
    #[sea_orm(num_value = 0)]
    Delisted,
    /// Visible to tenants.
    #[sea_orm(num_value = 1)]
    #[default]
    Listed,
}

/// Rent payment cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[derive(Default)]
pub enum PaymentType {
    #[sea_orm(num_value = 1)]
    #[default]
    Monthly,
    #[sea_orm(num_value = 2)]
    Quarterly,
    #[sea_orm(num_value = 3)]
    SemiAnnually,
    #[sea_orm(num_value = 4)]
    Annually,
}

/// Kind of property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[derive(Default)]
pub enum HouseType {
    #[sea_orm(num_value = 1)]
    #[default]
    Residence,
    #[sea_orm(num_value = 2)]
    Apartment,
    #[sea_orm(num_value = 3)]
    Villa,
    #[sea_orm(num_value = 4)]
    Shop,
}

/// Decoration / fit-out level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[derive(Default)]
pub enum Decoration {
    #[sea_orm(num_value = 1)]
    #[default]
    Basic,
    #[sea_orm(num_value = 2)]
    Refined,
    #[sea_orm(num_value = 3)]
    Luxury,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "house")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Listing title
    pub title: String,

    /// Free-text description
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Street address
    pub address: String,

    /// Floor area in square meters
    pub area: f64,

    /// Floor the unit is on
    pub floor: i32,

    /// Total floors in the building
    pub total_floor: i32,

    /// Room count
    pub rooms: i32,

    /// Living-room count
    pub halls: i32,

    /// Bathroom count
    pub bathrooms: i32,

    /// Monthly rent
    pub rent_price: f64,

    /// Deposit
    pub deposit: f64,

    /// Payment cadence
    pub payment_type: PaymentType,

    /// Property kind
    pub house_type: HouseType,

    /// Compass orientation, free text
    pub orientation: String,

    /// Fit-out level
    pub decoration: Decoration,

    /// Facility names
    #[sea_orm(column_type = "JsonBinary")]
    pub facilities: Json,

    /// Image URLs
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Latitude
    pub latitude: f64,

    /// Longitude
    pub longitude: f64,

    /// Whether the building has an elevator
    #[sea_orm(default_value = false)]
    pub is_elevator: bool,

    /// Listing status
    pub status: HouseStatus,

    /// View counter (monotonic, best-effort)
    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    /// Owning landlord's user ID. Immutable after creation.
    #[sea_orm(indexed)]
    pub landlord_id: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,

    /// Soft-delete marker; read paths filter on NULL.
    #[sea_orm(nullable, indexed)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LandlordId",
        to = "super::user::Column::Id"
    )]
    Landlord,
    #[sea_orm(has_many = "super::viewing::Entity")]
    Viewings,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Landlord.def()
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
