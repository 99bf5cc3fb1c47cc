use crate::paging::LimitArg;
use serde_json::Number;
use strum::{AsRefStr, Display};
use thiserror::Error;

pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Coarse failure category, exposed to clients as the error `code`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BothLimitsSet,
    NoLimitSet,
    NegativeLimit,
    LimitExceeded,
    InvalidLimitType,
    DatabaseError,
    CursorError,
}

/// Rejected pagination arguments. `Display` is the client-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passing both `first` and `last` to paginate the `{label}` connection is not supported.")]
    BothLimitsSet { label: &'static str },
    #[error("You must provide a `first` or `last` value to properly paginate the `{label}` connection.")]
    NoLimitSet { label: &'static str },
    #[error("`{arg}` on the `{label}` connection cannot be less than zero.")]
    NegativeLimit { arg: LimitArg, label: &'static str },
    #[error("Requesting `{amount}` records on the `{label}` connection exceeds the `{arg}` limit of {max} records.")]
    LimitExceeded {
        arg: LimitArg,
        /// As the client sent it.
        amount: Number,
        max: u64,
        label: &'static str,
    },
    #[error("`{arg}` must be of type `number` not `{type_name}`.")]
    InvalidLimitType {
        arg: LimitArg,
        type_name: &'static str,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BothLimitsSet { .. } => ErrorKind::BothLimitsSet,
            Self::NoLimitSet { .. } => ErrorKind::NoLimitSet,
            Self::NegativeLimit { .. } => ErrorKind::NegativeLimit,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::InvalidLimitType { .. } => ErrorKind::InvalidLimitType,
        }
    }

    /// Audit line recorded when `caller` is refused on `connection`.
    pub fn log_line(&self, caller: &str, connection: &str) -> String {
        match self {
            Self::BothLimitsSet { .. } => format!(
                "User: {caller} attempted to have `first` and `last` arguments set for: {connection}."
            ),
            Self::NoLimitSet { .. } => format!(
                "User: {caller} did not have either `first` or `last` arguments set for: {connection}."
            ),
            Self::NegativeLimit { arg, .. } => format!(
                "User: {caller} attempted to have `{arg}` set below zero for: {connection}."
            ),
            Self::LimitExceeded { arg, amount, .. } => format!(
                "User: {caller} attempted to have `{arg}` set to {amount} for: {connection}."
            ),
            Self::InvalidLimitType { arg, type_name } => format!(
                "User: {caller} attempted to have `{arg}` set as a {type_name} for: {connection}."
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unable to load {resource}. Please try again.")]
    Database { resource: &'static str },
    #[error("Unable to load {resource}. Please try again.")]
    Cursor { resource: &'static str },
}

impl ConnectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(e) => e.kind(),
            Self::Database { .. } => ErrorKind::DatabaseError,
            Self::Cursor { .. } => ErrorKind::CursorError,
        }
    }
}
