use error::AppHubError;

pub mod database;
pub mod error;
pub mod manifest;

pub type AppHubResult<T> = std::result::Result<T, AppHubError>;
