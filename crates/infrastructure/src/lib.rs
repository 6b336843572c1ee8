pub mod database;
pub mod repositories;
pub mod store;

pub use database::*;
pub use repositories::*;
pub use store::*;
