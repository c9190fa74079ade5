//! Stored notifications addressed to a single recipient.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{NotificationId, ProductId, UserId};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored level string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification level `{value}`")]
pub struct UnknownNotificationLevel {
    pub value: String,
}

impl FromStr for NotificationLevel {
    type Err = UnknownNotificationLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(UnknownNotificationLevel {
                value: other.to_owned(),
            }),
        }
    }
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub kind: String,
    pub message: String,
    pub product_id: Option<ProductId>,
    pub recipient_id: UserId,
    pub read: bool,
    pub level: NotificationLevel,
}

/// Longest notification category the store accepts.
pub const MAX_KIND_LEN: usize = 32;

/// Validation failures for new notifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationValidationError {
    /// Categories carry text and fit the column.
    #[error("notification type must be 1 to 32 characters")]
    InvalidKind,
    /// Messages must carry text.
    #[error("notification message must not be empty")]
    EmptyMessage,
}

/// Field values for a notification about to be stored. New notifications are
/// unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: String,
    pub message: String,
    pub product_id: Option<ProductId>,
    pub recipient_id: UserId,
    pub level: NotificationLevel,
}

impl NewNotification {
    /// Check a caller-built notification before it is stored.
    pub fn validate(&self) -> Result<(), NotificationValidationError> {
        let kind = self.kind.trim();
        if kind.is_empty() || kind.chars().count() > MAX_KIND_LEN {
            return Err(NotificationValidationError::InvalidKind);
        }
        if self.message.trim().is_empty() {
            return Err(NotificationValidationError::EmptyMessage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NotificationLevel::Info)]
    #[case(NotificationLevel::Warning)]
    #[case(NotificationLevel::Error)]
    fn levels_parse_their_own_text(#[case] level: NotificationLevel) {
        assert_eq!(level.as_str().parse::<NotificationLevel>(), Ok(level));
    }

    #[rstest]
    fn unknown_levels_are_rejected() {
        assert!("critical".parse::<NotificationLevel>().is_err());
    }

    fn manual(kind: &str, message: &str) -> NewNotification {
        NewNotification {
            kind: kind.to_owned(),
            message: message.to_owned(),
            product_id: None,
            recipient_id: UserId::new(1),
            level: NotificationLevel::Info,
        }
    }

    #[rstest]
    #[case("", "hello", Err(NotificationValidationError::InvalidKind))]
    #[case("  ", "hello", Err(NotificationValidationError::InvalidKind))]
    #[case("a-category-name-longer-than-32-chars", "hello", Err(NotificationValidationError::InvalidKind))]
    #[case("system", " ", Err(NotificationValidationError::EmptyMessage))]
    #[case("system", "maintenance tonight", Ok(()))]
    fn manual_notifications_are_validated(
        #[case] kind: &str,
        #[case] message: &str,
        #[case] expected: Result<(), NotificationValidationError>,
    ) {
        assert_eq!(manual(kind, message).validate(), expected);
    }
}
