use std::fmt::{Display, Formatter};

use crate::loader::LoadError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsErrorCode {
    /// A provider's settings value was neither a string nor a plain object.
    InvalidConfiguration,
    /// An `initialize` call named a provider missing from the registry.
    ProviderNotFound,
    /// A provider pushed to a page global whose bootstrap never installed it.
    MissingGlobal,
    InvalidArgument,
    Internal,
}

impl AnalyticsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsErrorCode::InvalidConfiguration => "analytics/invalid-configuration",
            AnalyticsErrorCode::ProviderNotFound => "analytics/provider-not-found",
            AnalyticsErrorCode::MissingGlobal => "analytics/missing-global",
            AnalyticsErrorCode::InvalidArgument => "analytics/invalid-argument",
            AnalyticsErrorCode::Internal => "analytics/internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsError {
    pub code: AnalyticsErrorCode,
    message: String,
}

impl AnalyticsError {
    pub fn new(code: AnalyticsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AnalyticsError {}

impl From<LoadError> for AnalyticsError {
    fn from(err: LoadError) -> Self {
        invalid_argument(err.to_string())
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

pub fn invalid_configuration(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidConfiguration, message)
}

pub fn provider_not_found(name: &str) -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::ProviderNotFound,
        format!("couldn't find a provider named \"{name}\""),
    )
}

pub fn missing_global(name: &str) -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::MissingGlobal,
        format!("page global `{name}` has not been installed by its bootstrap"),
    )
}

pub fn invalid_argument(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Internal, message)
}
