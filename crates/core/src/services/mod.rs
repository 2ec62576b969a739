//! Business logic services.

#![allow(missing_docs)]

pub mod favorite;
pub mod house;
pub mod landlord;
pub mod user;
pub mod viewing;

pub use favorite::FavoriteService;
pub use house::{CreateHouseInput, HouseService, UpdateHouseInput};
pub use landlord::{ApplyLandlordInput, LandlordService};
pub use user::{LoginInput, LoginOutput, RegisterInput, UserService};
pub use viewing::{CreateViewingInput, ViewingService};
