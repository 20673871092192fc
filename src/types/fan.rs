// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan direction.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Direction a fan blows in.
///
/// The variant doubles as the profile key under which the fan's speed codes
/// are grouped. Fans without a reversible motor keep their codes under
/// `"default"`.
///
/// # Examples
///
/// ```
/// use irdrive_lib::types::FanDirection;
///
/// assert_eq!(FanDirection::Reverse.as_key(), "reverse");
/// assert_eq!("forward".parse::<FanDirection>().unwrap(), FanDirection::Forward);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanDirection {
    /// Normal airflow.
    Forward,
    /// Reversed airflow.
    Reverse,
    /// Single-direction fan.
    Default,
}

impl FanDirection {
    /// Returns the profile key for this direction.
    #[must_use]
    pub const fn as_key(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for FanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for FanDirection {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            "default" => Ok(Self::Default),
            _ => Err(ValueError::InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for direction in [FanDirection::Forward, FanDirection::Reverse, FanDirection::Default] {
            assert_eq!(direction.as_key().parse::<FanDirection>().unwrap(), direction);
        }
    }

    #[test]
    fn invalid_direction() {
        assert!(matches!(
            "sideways".parse::<FanDirection>(),
            Err(ValueError::InvalidDirection(_))
        ));
    }
}
