pub mod add_protocol;
pub mod admin;
pub mod deposit;
pub mod initialize;
pub mod switch_protocol;
pub mod views;
pub mod withdraw;

pub use add_protocol::*;
pub use admin::*;
pub use deposit::*;
pub use initialize::*;
pub use switch_protocol::*;
pub use views::*;
pub use withdraw::*;
