// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `irdrive` library.
//!
//! Every failure is local to a single command invocation: it is reported to
//! the caller, never corrupts previously committed device state, and leaves
//! the transmission lock and the verification timer usable for the next
//! request.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A command path could not be resolved to a transmittable code.
    #[error("unresolved command: {0}")]
    Unresolved(#[from] ResolveError),

    /// The controller failed while a command sequence was being sent.
    #[error("transmission failed: {0}")]
    Transmission(#[from] TransmissionError),

    /// The device configuration or profile is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the controller outside of a sequence.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a device profile or configuration.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// A command path did not lead to a leaf code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A selector key is missing, or the node before it is already a leaf.
    #[error("missing device code for '{key}' command")]
    NotFound {
        /// The key at which resolution stopped.
        key: String,
    },

    /// The final key names a group of codes rather than a single code.
    ///
    /// Callers use this to fall back to relative stepping.
    #[error("'{key}' has no direct code")]
    NoDirectCode {
        /// The key that resolved to a branch.
        key: String,
    },

    /// No selector keys were given.
    #[error("empty command path")]
    EmptyPath,
}

impl ResolveError {
    /// Returns the key at which resolution failed, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NotFound { key } | Self::NoDirectCode { key } => Some(key),
            Self::EmptyPath => None,
        }
    }
}

/// The controller reported a failure in the middle of a sequence.
///
/// The remaining codes of the sequence were abandoned and no state was
/// committed.
#[derive(Debug, Error)]
#[error("code {index} of {total} failed: {source}")]
pub struct TransmissionError {
    /// Zero-based index of the code that failed.
    pub index: usize,
    /// Number of codes in the abandoned sequence.
    pub total: usize,
    /// The controller failure.
    #[source]
    pub source: ProtocolError,
}

/// Errors in device configuration and profile data.
///
/// These disable the affected feature, not the whole device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value scale has no entries.
    #[error("{scale} scale is empty")]
    EmptyScale {
        /// Name of the scale (e.g. `speed`, `brightness`).
        scale: String,
    },

    /// A numeric scale is not strictly increasing.
    #[error("{scale} scale is not strictly increasing at position {position}")]
    UnorderedScale {
        /// Name of the scale.
        scale: String,
        /// Position of the first out-of-order entry.
        position: usize,
    },

    /// The command vocabulary has no commands.
    #[error("command vocabulary is empty")]
    EmptyCommands,

    /// One or more command paths hold values that are neither codes nor groups.
    #[error("malformed command paths: {}", paths.join(", "))]
    MalformedCommands {
        /// Every malformed path, dotted.
        paths: Vec<String>,
    },

    /// A configured delay is zero or negative.
    #[error("{name} must be positive")]
    InvalidDelay {
        /// The offending setting.
        name: &'static str,
    },
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// An invalid fan direction string was provided.
    #[error("invalid fan direction: {0}")]
    InvalidDirection(String),

    /// A media id is not a channel number.
    #[error("media id must be a channel number, got '{0}'")]
    InvalidChannel(String),

    /// A media type other than channel was requested.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The requested source is not offered by the device.
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

/// Errors related to talking to an IR/RF controller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The controller rejected the code.
    #[error("code rejected: {0}")]
    Rejected(String),
}

/// Errors related to parsing profiles and configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device does not support the requested capability.
    #[error("device does not support {capability}")]
    UnsupportedCapability {
        /// The capability that is not supported.
        capability: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::NotFound {
            key: "x".to_string(),
        };
        assert_eq!(err.to_string(), "missing device code for 'x' command");
        assert_eq!(err.key(), Some("x"));
        assert_eq!(ResolveError::EmptyPath.key(), None);
    }

    #[test]
    fn transmission_error_display() {
        let err = TransmissionError {
            index: 1,
            total: 3,
            source: ProtocolError::Timeout(500),
        };
        assert_eq!(
            err.to_string(),
            "code 1 of 3 failed: request timed out after 500 ms"
        );
    }

    #[test]
    fn malformed_commands_lists_every_path() {
        let err = ConfigError::MalformedCommands {
            paths: vec!["fan.low".to_string(), "mute".to_string()],
        };
        assert_eq!(err.to_string(), "malformed command paths: fan.low, mute");
    }

    #[test]
    fn error_from_resolve_error() {
        let err: Error = ResolveError::EmptyPath.into();
        assert!(matches!(err, Error::Unresolved(ResolveError::EmptyPath)));
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::UnsupportedCapability {
            capability: "oscillation".to_string(),
        };
        assert_eq!(err.to_string(), "device does not support oscillation");
    }
}
