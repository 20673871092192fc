// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recursive command tree and path resolution.

use serde_json::Value;

use crate::error::{ConfigError, ResolveError};

use super::Code;

/// Immutable command vocabulary of a device.
///
/// A tree node is either a [`Leaf`](Self::Leaf) holding a transmittable code
/// or a [`Branch`](Self::Branch) mapping selector keys to further nodes.
/// Branch entries keep the order in which the profile lists them.
///
/// # Examples
///
/// ```
/// use irdrive_lib::command::CommandTree;
/// use irdrive_lib::ResolveError;
///
/// let tree = CommandTree::from_value(&serde_json::json!({
///     "off": "CODE_OFF",
///     "forward": { "low": "CODE_LOW", "high": "CODE_HIGH" },
/// }))
/// .unwrap();
///
/// assert_eq!(tree.resolve(&["forward", "high"]).unwrap().as_str(), "CODE_HIGH");
///
/// // A group of codes is not a code by itself
/// assert_eq!(
///     tree.resolve(&["forward"]),
///     Err(ResolveError::NoDirectCode { key: "forward".to_string() })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum CommandTree {
    /// A terminal, transmittable code.
    Leaf(Code),
    /// A group of named sub-trees, in profile order.
    Branch(Vec<(String, CommandTree)>),
}

impl CommandTree {
    /// Builds and validates a tree from a parsed profile `commands` object.
    ///
    /// `null` entries mean the command is absent and are dropped. Every other
    /// entry must be a string (a code) or a non-empty object (a group).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedCommands`] listing every malformed
    /// path, or [`ConfigError::EmptyCommands`] if no command remains.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = value else {
            return Err(ConfigError::EmptyCommands);
        };

        let mut malformed = Vec::new();
        let entries = Self::build_entries(map, "", &mut malformed);

        if !malformed.is_empty() {
            return Err(ConfigError::MalformedCommands { paths: malformed });
        }
        if entries.is_empty() {
            return Err(ConfigError::EmptyCommands);
        }

        Ok(Self::Branch(entries))
    }

    fn build_entries(
        map: &serde_json::Map<String, Value>,
        prefix: &str,
        malformed: &mut Vec<String>,
    ) -> Vec<(String, CommandTree)> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            match value {
                Value::Null => {}
                Value::String(code) => entries.push((key.clone(), Self::Leaf(Code::new(code)))),
                Value::Object(children) => {
                    let nested = Self::build_entries(children, &path, malformed);
                    if nested.is_empty() {
                        if children.values().all(|v| !v.is_null()) {
                            malformed.push(path);
                        }
                    } else {
                        entries.push((key.clone(), Self::Branch(nested)));
                    }
                }
                Value::Bool(_) | Value::Number(_) | Value::Array(_) => malformed.push(path),
            }
        }
        entries
    }

    /// Resolves a selector path to a leaf code.
    ///
    /// Each key before the last must name a group; the last key must name a
    /// code. Resolution never descends into a leaf.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] naming the first key that is missing, or
    ///   that follows a leaf.
    /// - [`ResolveError::NoDirectCode`] if the last key names a group.
    /// - [`ResolveError::EmptyPath`] if `path` is empty.
    pub fn resolve<K: AsRef<str>>(&self, path: &[K]) -> Result<&Code, ResolveError> {
        let (last, init) = path.split_last().ok_or(ResolveError::EmptyPath)?;

        let mut node = self;
        for key in init {
            let key = key.as_ref();
            node = node.get(key).ok_or_else(|| ResolveError::NotFound {
                key: key.to_string(),
            })?;
        }

        let key = last.as_ref();
        match node.get(key) {
            Some(Self::Leaf(code)) => Ok(code),
            Some(Self::Branch(_)) => Err(ResolveError::NoDirectCode {
                key: key.to_string(),
            }),
            None => Err(ResolveError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Returns the child node for `key`, or `None` for a leaf or a missing key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CommandTree> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// Returns `true` if this node has a child named `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if `key` names a group of codes.
    #[must_use]
    pub fn contains_branch(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Self::Branch(_)))
    }

    /// Returns the code directly under `key`, if that entry is a leaf.
    #[must_use]
    pub fn leaf(&self, key: &str) -> Option<&Code> {
        self.get(key).and_then(Self::as_code)
    }

    /// Returns this node's code if it is a leaf.
    #[must_use]
    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Self::Leaf(code) => Some(code),
            Self::Branch(_) => None,
        }
    }

    /// Returns the child keys in profile order (empty for a leaf).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let entries: &[(String, CommandTree)] = match self {
            Self::Leaf(_) => &[],
            Self::Branch(entries) => entries,
        };
        entries.iter().map(|(k, _)| k.as_str())
    }
}

impl TryFrom<Value> for CommandTree {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
