// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Media types accepted by media players.

use std::fmt;
use std::str::FromStr;

/// Kind of media requested by a play-media call.
///
/// IR media players can only "play" channels, by keying in their digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// A numbered broadcast channel.
    Channel,
    /// Any other media type, kept verbatim for error reporting.
    Other(String),
}

impl MediaType {
    /// Returns the host-facing name of the media type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Channel => "channel",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("channel") {
            Ok(Self::Channel)
        } else {
            Ok(Self::Other(s.to_string()))
        }
    }
}
