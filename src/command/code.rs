// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opaque transmittable code.

use std::fmt;
use std::sync::Arc;

/// An opaque IR/RF payload, as found in the device profile.
///
/// The library never interprets a code; it only hands it to a
/// [`Controller`](crate::protocol::Controller). Cloning is cheap.
///
/// # Examples
///
/// ```
/// use irdrive_lib::command::Code;
///
/// let code = Code::new("JgBQAAABKZIUEhQ3");
/// assert_eq!(code.as_str(), "JgBQAAABKZIUEhQ3");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Code(Arc<str>);

impl Code {
    /// Longest prefix shown by `Debug` and `Display`.
    const PREVIEW_LEN: usize = 16;

    /// Creates a code from its raw payload.
    #[must_use]
    pub fn new(payload: impl AsRef<str>) -> Self {
        Self(Arc::from(payload.as_ref()))
    }

    /// Returns the raw payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn preview(&self) -> &str {
        match self.0.char_indices().nth(Self::PREVIEW_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({:?}, {} bytes)", self.preview(), self.len())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preview().len() < self.len() {
            write!(f, "{}...", self.preview())
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncates_long_payloads() {
        let code = Code::new("0123456789abcdefXYZ");
        assert_eq!(code.to_string(), "0123456789abcdef...");
        assert_eq!(Code::new("short").to_string(), "short");
    }

    #[test]
    fn debug_shows_length() {
        let code = Code::new("0123456789abcdefXYZ");
        assert_eq!(format!("{code:?}"), "Code(\"0123456789abcdef\", 19 bytes)");
    }

    #[test]
    fn clones_share_payload() {
        let code = Code::from("abc".to_string());
        let copy = code.clone();
        assert_eq!(code, copy);
        assert!(Arc::ptr_eq(&code.0, &copy.0));
    }
}
