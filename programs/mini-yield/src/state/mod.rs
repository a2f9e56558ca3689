pub mod asset;
pub mod config;
pub mod user;

pub use asset::*;
pub use config::*;
pub use user::*;
