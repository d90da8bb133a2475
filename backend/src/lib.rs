pub mod catchers;
pub mod config;
pub mod persist;
pub mod queries;
pub mod registry;
pub mod reply;
pub mod routes;
pub mod store;
pub mod utils;
pub use pollbot_shared::{models::*, error::*, command::*};
