pub mod config;
pub mod errors;
pub mod models;
pub mod pagination;
pub mod services;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use models::*;
pub use services::*;
pub use utils::*;
