//! SeaORM entities.

pub mod favorite;
pub mod house;
pub mod landlord;
pub mod user;
pub mod viewing;

pub use favorite::Entity as Favorite;
pub use house::Entity as House;
pub use landlord::Entity as Landlord;
pub use user::Entity as User;
pub use viewing::Entity as Viewing;
