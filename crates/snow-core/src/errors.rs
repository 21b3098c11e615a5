//! Structured error types shared across snowflash crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SnowError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (channel ids, lengths, model keys).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the aggregation engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SnowError {
    /// Malformed channel grouping or analysis configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Length mismatches, invalid values or ordering violations in input data.
    #[error("data shape error: {0}")]
    DataShape(ErrorInfo),
    /// A requested channel, time step, file or column is absent.
    #[error("missing data error: {0}")]
    MissingData(ErrorInfo),
    /// A bin count or slice lies outside the available time steps.
    #[error("range error: {0}")]
    Range(ErrorInfo),
    /// Work was abandoned after a cancellation request.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
    /// Filesystem and serialization failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl SnowError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SnowError::Config(info)
            | SnowError::DataShape(info)
            | SnowError::MissingData(info)
            | SnowError::Range(info)
            | SnowError::Cancelled(info)
            | SnowError::Io(info) => info,
        }
    }

    /// Returns the stable family label used in reports and logs.
    pub fn family(&self) -> &'static str {
        match self {
            SnowError::Config(_) => "config",
            SnowError::DataShape(_) => "data-shape",
            SnowError::MissingData(_) => "missing-data",
            SnowError::Range(_) => "range",
            SnowError::Cancelled(_) => "cancelled",
            SnowError::Io(_) => "io",
        }
    }

    /// Attaches an additional context entry, preserving the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            SnowError::Config(info) => SnowError::Config(info.with_context(key, value)),
            SnowError::DataShape(info) => SnowError::DataShape(info.with_context(key, value)),
            SnowError::MissingData(info) => SnowError::MissingData(info.with_context(key, value)),
            SnowError::Range(info) => SnowError::Range(info.with_context(key, value)),
            SnowError::Cancelled(info) => SnowError::Cancelled(info.with_context(key, value)),
            SnowError::Io(info) => SnowError::Io(info.with_context(key, value)),
        }
    }
}
