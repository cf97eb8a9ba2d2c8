pub mod error;
pub mod health;

pub use error::AppError;
pub use health::HealthStatus;
