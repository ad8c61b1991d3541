pub mod cognito_service;

pub use cognito_service::*;
