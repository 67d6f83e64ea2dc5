use std::fmt;

use serde::{Deserialize, Serialize};

/// Interaction Model status code carried in status IBs and status responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum StatusCode {
    Success,
    Failure,
    InvalidSubscription,
    UnsupportedAccess,
    UnsupportedEndpoint,
    InvalidAction,
    UnsupportedCommand,
    InvalidCommand,
    UnsupportedAttribute,
    ConstraintError,
    UnsupportedWrite,
    ResourceExhausted,
    NotFound,
    UnreportableAttribute,
    InvalidDataType,
    UnsupportedRead,
    DataVersionMismatch,
    Timeout,
    Busy,
    UnsupportedCluster,
    NeedsTimedInteraction,
    UnsupportedEvent,
    /// A code this crate has no name for, kept as received.
    Other(u8),
}

const NAMED: [(StatusCode, u8, &str); 22] = [
    (StatusCode::Success, 0x00, "success"),
    (StatusCode::Failure, 0x01, "failure"),
    (StatusCode::InvalidSubscription, 0x7D, "invalid-subscription"),
    (StatusCode::UnsupportedAccess, 0x7E, "unsupported-access"),
    (StatusCode::UnsupportedEndpoint, 0x7F, "unsupported-endpoint"),
    (StatusCode::InvalidAction, 0x80, "invalid-action"),
    (StatusCode::UnsupportedCommand, 0x81, "unsupported-command"),
    (StatusCode::InvalidCommand, 0x85, "invalid-command"),
    (StatusCode::UnsupportedAttribute, 0x86, "unsupported-attribute"),
    (StatusCode::ConstraintError, 0x87, "constraint-error"),
    (StatusCode::UnsupportedWrite, 0x88, "unsupported-write"),
    (StatusCode::ResourceExhausted, 0x89, "resource-exhausted"),
    (StatusCode::NotFound, 0x8B, "not-found"),
    (StatusCode::UnreportableAttribute, 0x8C, "unreportable-attribute"),
    (StatusCode::InvalidDataType, 0x8D, "invalid-data-type"),
    (StatusCode::UnsupportedRead, 0x8F, "unsupported-read"),
    (StatusCode::DataVersionMismatch, 0x92, "data-version-mismatch"),
    (StatusCode::Timeout, 0x94, "timeout"),
    (StatusCode::Busy, 0x9C, "busy"),
    (StatusCode::UnsupportedCluster, 0xC3, "unsupported-cluster"),
    (StatusCode::NeedsTimedInteraction, 0xC6, "needs-timed-interaction"),
    (StatusCode::UnsupportedEvent, 0xC7, "unsupported-event"),
];

impl StatusCode {
    pub fn code(self) -> u8 {
        match self {
            StatusCode::Other(code) => code,
            named => NAMED
                .iter()
                .find(|(status, _, _)| *status == named)
                .map_or(0x01, |(_, code, _)| *code),
        }
    }

    /// Kebab-case name, or `None` for codes without one.
    pub fn name(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(status, _, _)| *status == self)
            .map(|(_, _, name)| *name)
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

impl From<u8> for StatusCode {
    fn from(code: u8) -> Self {
        NAMED
            .iter()
            .find(|(_, value, _)| *value == code)
            .map_or(StatusCode::Other(code), |(status, _, _)| *status)
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:02X})", self.code()),
            None => write!(f, "0x{:02X}", self.code()),
        }
    }
}
