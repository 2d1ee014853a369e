// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the table subsystem.
//!
//! `ConnectionUnavailable` is the one distinguished transient error: the
//! operation facade recovers from it locally (reconnect, bounded retry,
//! drop). Every other variant is opaque to the facade and propagates to the
//! caller as fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RivuletError {
    /// Transient loss of the backend connection. Triggers the reconnect
    /// path; never surfaces to the query engine.
    #[error("Connection unavailable: {message}")]
    ConnectionUnavailable { message: String },

    /// Condition or update-set compilation failed. Raised at query-compile
    /// time, never on the event path.
    #[error("Compilation failed for table '{table_name}': {message}")]
    TableCompile { table_name: String, message: String },

    /// The backend does not implement the requested primitive.
    #[error("Operation '{operation}' not supported: {message}")]
    OperationNotSupported { operation: String, message: String },

    /// Non-transient backend failure. Aborts the current event chunk.
    #[error("Storage failure at table '{table_name}': {message}")]
    Storage { table_name: String, message: String },
}

impl RivuletError {
    pub fn connection_unavailable(message: impl Into<String>) -> Self {
        RivuletError::ConnectionUnavailable {
            message: message.into(),
        }
    }

    /// True when the facade should enter the reconnect path rather than
    /// propagate.
    pub fn is_connection_unavailable(&self) -> bool {
        matches!(self, RivuletError::ConnectionUnavailable { .. })
    }
}
