//! Remote-call errors, their classification, and reconciliation errors.

use thiserror::Error;

/// Error returned by a [`RemoteConfigClient`](crate::RemoteConfigClient) call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The service answered with an error response.
    #[error("{code} (status {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a service response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Symbolic code of a service error. Transport and decode errors have none.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Service { code, .. } => Some(ErrorCode::parse(code)),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Returns true if this error means `config` does not exist.
    pub fn signals_absence_of(&self, config: ConfigKind) -> bool {
        self.code()
            .is_some_and(|code| code.signals_absence_of(config))
    }
}

/// Symbolic service error codes the reconciler cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// The function or alias does not exist.
    ResourceNotFound,

    /// The alias has no provisioned-concurrency configuration.
    ProvisionedConcurrencyConfigNotFound,

    /// The alias has no event-invoke configuration.
    EventInvokeConfigNotFound,

    /// Any other service error type.
    Other(String),
}

impl ErrorCode {
    pub const RESOURCE_NOT_FOUND: &'static str = "ResourceNotFoundException";
    pub const PROVISIONED_CONCURRENCY_CONFIG_NOT_FOUND: &'static str =
        "ProvisionedConcurrencyConfigNotFoundException";
    pub const EVENT_INVOKE_CONFIG_NOT_FOUND: &'static str = "EventInvokeConfigNotFoundException";

    /// Parse a service error type.
    ///
    /// Accepts the bare name as well as the qualified forms services put in
    /// headers and bodies (`Name:http://...`, `namespace#Name`).
    pub fn parse(raw: &str) -> Self {
        let name = raw.split(':').next().unwrap_or(raw);
        let name = name.rsplit('#').next().unwrap_or(name).trim();

        match name {
            Self::RESOURCE_NOT_FOUND => Self::ResourceNotFound,
            Self::PROVISIONED_CONCURRENCY_CONFIG_NOT_FOUND => {
                Self::ProvisionedConcurrencyConfigNotFound
            }
            Self::EVENT_INVOKE_CONFIG_NOT_FOUND => Self::EventInvokeConfigNotFound,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ResourceNotFound => Self::RESOURCE_NOT_FOUND,
            Self::ProvisionedConcurrencyConfigNotFound => {
                Self::PROVISIONED_CONCURRENCY_CONFIG_NOT_FOUND
            }
            Self::EventInvokeConfigNotFound => Self::EVENT_INVOKE_CONFIG_NOT_FOUND,
            Self::Other(code) => code,
        }
    }

    /// Returns true if this code means `config` does not exist.
    ///
    /// A missing function or alias implies a missing configuration of
    /// either kind.
    pub fn signals_absence_of(&self, config: ConfigKind) -> bool {
        match self {
            Self::ResourceNotFound => true,
            Self::ProvisionedConcurrencyConfigNotFound => {
                config == ConfigKind::ProvisionedConcurrency
            }
            Self::EventInvokeConfigNotFound => config == ConfigKind::EventInvoke,
            Self::Other(_) => false,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The satellite configurations of an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    EventInvoke,
    ProvisionedConcurrency,
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors surfaced by the synchronizer and readers.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A remote call failed with something other than absence.
    #[error("{operation} failed: {source}")]
    Client {
        operation: &'static str,
        #[source]
        source: ClientError,
    },

    /// The context was cancelled before the call completed.
    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

impl ReconcileError {
    /// The underlying client error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    /// Name of the remote operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Client { operation, .. } | Self::Cancelled { operation } => operation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub(crate) fn signals_absence_of(&self, config: ConfigKind) -> bool {
        self.client_error()
            .is_some_and(|e| e.signals_absence_of(config))
    }
}

/// Turn an absence error for `config` into `Ok(None)`.
pub(crate) fn absent_as_none<T>(
    result: ReconcileResult<T>,
    config: ConfigKind,
) -> ReconcileResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.signals_absence_of(config) => Ok(None),
        Err(e) => Err(e),
    }
}
