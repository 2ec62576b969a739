//! Repository layer: all SQL lives here.

pub mod favorite;
pub mod house;
pub mod landlord;
pub mod user;
pub mod viewing;

pub use favorite::FavoriteRepository;
pub use house::{HouseQuery, HouseRepository, HouseSort};
pub use landlord::LandlordRepository;
pub use user::UserRepository;
pub use viewing::ViewingRepository;
