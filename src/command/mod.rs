// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command vocabulary of an IR/RF device.
//!
//! A device profile describes the remote's codes as a nested mapping. Each
//! entry is either a transmittable [`Code`] or a group of further entries,
//! selected by key:
//!
//! | Profile entry | Meaning | Resolved with |
//! |---------------|---------|---------------|
//! | `"off": "JgBQ..."` | single code | `["off"]` |
//! | `"forward": { "low": "..." }` | codes per speed | `["forward", "low"]` |
//! | `"sources": { "HDMI 1": "..." }` | codes per source | `["sources", "HDMI 1"]` |
//!
//! The vocabulary is parsed and validated once into a [`CommandTree`] and
//! never changes afterwards.
//!
//! # Examples
//!
//! ```
//! use irdrive_lib::command::CommandTree;
//!
//! let tree = CommandTree::from_value(&serde_json::json!({
//!     "on": "CODE_A",
//!     "off": "CODE_B",
//! }))
//! .unwrap();
//!
//! assert_eq!(tree.resolve(&["on"]).unwrap().as_str(), "CODE_A");
//! assert!(tree.resolve(&["off", "x"]).is_err());
//! ```

mod code;
mod tree;

pub use code::Code;
pub use tree::CommandTree;
