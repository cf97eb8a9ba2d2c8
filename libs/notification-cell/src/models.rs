// libs/notification-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tells a patient their appointment moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleNotice {
    pub recipient: String,
    pub new_date: NaiveDate,
    pub new_time: NaiveTime,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Delivery(err.to_string())
    }
}
