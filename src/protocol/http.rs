// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP controller implementation.

use std::time::Duration;

use reqwest::Client;

use crate::command::Code;
use crate::error::ProtocolError;
use crate::protocol::Controller;

// ============================================================================
// HttpConfig - Configuration for HTTP controllers
// ============================================================================

/// Configuration for an HTTP IR blaster.
///
/// Each code is an independent `GET` request; there is no persistent
/// connection.
///
/// # Examples
///
/// ```
/// use irdrive_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.120");
///
/// // With all options
/// let config = HttpConfig::new("192.168.1.120")
///     .with_port(8080)
///     .with_encoding("prontohex")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.120:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    encoding: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default code encoding path segment.
    pub const DEFAULT_ENCODING: &'static str = "raw";

    /// Creates a new HTTP configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            encoding: Self::DEFAULT_ENCODING.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets the code encoding, usually the profile's `commandsEncoding`.
    ///
    /// The value is lowercased and used as a path segment.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl AsRef<str>) -> Self {
        self.encoding = encoding.as_ref().to_lowercase();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the code encoding.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates an `HttpController` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_controller(self) -> Result<HttpController, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpController {
            base_url,
            encoding: self.encoding,
            timeout: self.timeout,
            client,
        })
    }
}

// ============================================================================
// HttpController
// ============================================================================

/// Controller for IR blasters with an HTTP command endpoint.
///
/// Codes are sent as `GET {base}/commands/ir/{encoding}/{code}`.
///
/// # Examples
///
/// ```no_run
/// use irdrive_lib::command::Code;
/// use irdrive_lib::protocol::{Controller, HttpConfig};
///
/// # async fn example() -> irdrive_lib::Result<()> {
/// let controller = HttpConfig::new("192.168.1.120").into_controller()?;
/// controller.send(&Code::new("JgBQAAABKZIUEhQ3")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpController {
    base_url: String,
    encoding: String,
    timeout: Duration,
    client: Client,
}

impl HttpController {
    /// Creates a controller for the specified host with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(host).into_controller()
    }

    /// Returns the base URL of the controller.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for a code.
    fn build_url(&self, code: &Code) -> String {
        format!(
            "{}/commands/ir/{}/{}",
            self.base_url,
            urlencoding::encode(&self.encoding),
            urlencoding::encode(code.as_str())
        )
    }
}

impl Controller for HttpController {
    async fn send(&self, code: &Code) -> Result<(), ProtocolError> {
        let url = self.build_url(code);

        tracing::debug!(base_url = %self.base_url, code = %code, "Sending code over HTTP");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                    ProtocolError::Timeout(millis)
                } else {
                    ProtocolError::Http(err)
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(ProtocolError::Rejected(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if !status.is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_encodes_code() {
        let controller = HttpController::new("192.168.1.120").unwrap();
        let url = controller.build_url(&Code::new("ab+c/d=="));
        assert_eq!(
            url,
            "http://192.168.1.120/commands/ir/raw/ab%2Bc%2Fd%3D%3D"
        );
    }

    #[test]
    fn build_url_with_encoding() {
        let controller = HttpConfig::new("192.168.1.120")
            .with_encoding("Pronto")
            .into_controller()
            .unwrap();
        let url = controller.build_url(&Code::new("0000 006D"));
        assert_eq!(
            url,
            "http://192.168.1.120/commands/ir/pronto/0000%20006D"
        );
    }

    #[test]
    fn host_with_scheme_is_kept() {
        let controller = HttpController::new("https://blaster.local/").unwrap();
        assert_eq!(controller.base_url(), "https://blaster.local");
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = HttpConfig::new("  ").into_controller();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.120");
        assert_eq!(config.host(), "192.168.1.120");
        assert_eq!(config.port(), 80);
        assert_eq!(config.encoding(), "raw");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_config_with_https() {
        let config = HttpConfig::new("192.168.1.120").with_https();
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://192.168.1.120");
    }

    #[test]
    fn http_config_with_https_custom_port() {
        let config = HttpConfig::new("192.168.1.120")
            .with_port(8443)
            .with_https();
        assert_eq!(config.base_url(), "https://192.168.1.120:8443");
    }

    #[test]
    fn http_config_base_url_custom_port() {
        let config = HttpConfig::new("192.168.1.120").with_port(8080);
        assert_eq!(config.base_url(), "http://192.168.1.120:8080");
    }
}
