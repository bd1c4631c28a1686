use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// A pending request from one user to start a game with another.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Invitation {
    pub id: Uuid,
    pub from_user: UserId,
    pub to_user: UserId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Invitation {
    pub const MAX_MESSAGE_LENGTH: usize = 300;

    pub fn new(from_user: UserId, to_user: UserId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user,
            to_user,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
