// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered discrete value scales and stepping.
//!
//! Many remotes cannot jump to an absolute brightness or color temperature;
//! they only offer "brighter"/"dimmer" buttons. This module maps arbitrary
//! targets onto a device's discrete levels and turns a level change into a
//! number of relative button presses.
//!
//! Two matching functions are provided, with deliberately different
//! tie-breaking:
//!
//! - [`closest_match_index`] prefers the **higher** index on equal distance.
//! - [`closest_match_value`] prefers the **first** entry on equal distance.
//!
//! [`precision_round`] snaps free-form numbers to a device's reporting step.
//!
//! # Examples
//!
//! ```
//! use irdrive_lib::scale::{closest_match_index, OrderedScale, StepDirection};
//!
//! assert_eq!(closest_match_index(Some(4), &[1, 3, 5, 7]), 2);
//!
//! let levels = OrderedScale::numeric("brightness", vec![25, 50, 75, 100, 150]).unwrap();
//! let plan = levels.step_plan(Some(50), 75);
//! assert_eq!(plan.direction(), StepDirection::Increase);
//! assert_eq!(plan.steps(), 1);
//! ```

mod step;

pub use step::{StepDirection, StepPlan};

use crate::error::ConfigError;

/// Returns the index of the scale entry closest to `value`.
///
/// The scan stops at the first entry strictly greater than `value` (an
/// absent value counts as 0). The previous entry wins only if it is strictly
/// closer, so an exact tie resolves to the higher index. Values beyond the
/// last entry resolve to the last index.
///
/// `scale` is expected to be sorted ascending; an empty scale yields 0.
///
/// # Examples
///
/// ```
/// use irdrive_lib::scale::closest_match_index;
///
/// let scale = [1, 3, 5, 7];
/// assert_eq!(closest_match_index(Some(4), &scale), 2);
/// assert_eq!(closest_match_index(Some(8), &scale), 3);
/// assert_eq!(closest_match_index(None, &scale), 0);
/// ```
#[must_use]
pub fn closest_match_index(value: Option<u32>, scale: &[u32]) -> usize {
    let value = i64::from(value.unwrap_or(0));
    let mut previous: Option<i64> = None;

    for (index, &entry) in scale.iter().enumerate() {
        let entry = i64::from(entry);
        if entry > value {
            return match previous {
                Some(previous) if value - previous < entry - value => index - 1,
                _ => index,
            };
        }
        previous = Some(entry);
    }

    scale.len().saturating_sub(1)
}

/// Returns the scale entry with the smallest absolute distance to `value`.
///
/// On equal distance the entry that comes first in the scale wins. Returns
/// `None` if `value` is absent or the scale is empty.
///
/// # Examples
///
/// ```
/// use irdrive_lib::scale::closest_match_value;
///
/// assert_eq!(closest_match_value(Some(4.0), &[1_u32, 3, 5, 7]), Some(3));
/// assert_eq!(closest_match_value(None, &[1_u32, 3]), None);
/// ```
#[must_use]
pub fn closest_match_value<T>(value: Option<f64>, scale: &[T]) -> Option<T>
where
    T: Copy + Into<f64>,
{
    let value = value?;
    scale
        .iter()
        .copied()
        .fold(None::<(T, f64)>, |best, entry| {
            let distance = (entry.into() - value).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((entry, distance)),
            }
        })
        .map(|(entry, _)| entry)
}

/// Rounds `number` to a device's display precision.
///
/// Supported precisions are `0.1`, `0.5`, `1` and whole steps above `1`
/// (fractional steps above `1` are truncated). Halves round away from zero.
/// Returns `None` for any other precision.
///
/// # Examples
///
/// ```
/// use irdrive_lib::scale::precision_round;
///
/// assert_eq!(precision_round(21.26, 0.5), Some(21.5));
/// assert_eq!(precision_round(21.26, 0.1), Some(21.3));
/// assert_eq!(precision_round(23.0, 5.0), Some(25.0));
/// assert_eq!(precision_round(21.0, 0.25), None);
/// ```
#[must_use]
pub fn precision_round(number: f64, precision: f64) -> Option<f64> {
    const EPSILON: f64 = 1e-9;

    if (precision - 0.1).abs() < EPSILON {
        Some((number * 10.0).round() / 10.0)
    } else if (precision - 0.5).abs() < EPSILON {
        Some((number * 2.0).round() / 2.0)
    } else if (precision - 1.0).abs() < EPSILON {
        Some(number.round())
    } else if precision > 1.0 {
        let step = precision.trunc();
        Some((number / step).round() * step)
    } else {
        None
    }
}

/// A non-empty, ordered list of discrete device levels.
///
/// Label scales (fan speeds such as `low`, `medium`, `high`) keep the order
/// given by the profile. Numeric scales (brightness levels, color
/// temperatures in Kelvin) must be strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrderedScale<T> {
    values: Vec<T>,
}

impl<T> OrderedScale<T> {
    /// Creates a scale from values in their meaningful order.
    ///
    /// `name` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyScale`] if `values` is empty.
    pub fn new(name: &str, values: Vec<T>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyScale {
                scale: name.to_string(),
            });
        }
        Ok(Self { values })
    }

    /// Returns the number of levels (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the scale has no levels, which construction rules out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the level at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Returns the lowest level.
    #[must_use]
    pub fn first(&self) -> &T {
        &self.values[0]
    }

    /// Returns the highest level.
    #[must_use]
    pub fn last(&self) -> &T {
        &self.values[self.last_index()]
    }

    /// Returns the index of the highest level.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.values.len() - 1
    }

    /// Returns `true` if `index` is the first or last level.
    #[must_use]
    pub fn is_boundary(&self, index: usize) -> bool {
        index == 0 || index == self.last_index()
    }

    /// Returns the levels as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterates over the levels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Maps a percentage (0-100) onto a level.
    ///
    /// Level `i` covers percentages up to `(i + 1) * 100 / len`; anything
    /// above the last bound maps to the highest level.
    #[must_use]
    pub fn percentage_to_item(&self, percentage: u8) -> &T {
        let len = self.values.len();
        self.values
            .iter()
            .enumerate()
            .find(|(offset, _)| usize::from(percentage) <= (offset + 1) * 100 / len)
            .map_or_else(|| self.last(), |(_, item)| item)
    }
}

impl<T: PartialEq> OrderedScale<T> {
    /// Returns the index of `item`, if it is a level of this scale.
    #[must_use]
    pub fn position(&self, item: &T) -> Option<usize> {
        self.values.iter().position(|v| v == item)
    }

    /// Returns `true` if `item` is a level of this scale.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    /// Maps a level onto the percentage at the top of its band.
    ///
    /// Returns `None` if `item` is not a level of this scale.
    #[must_use]
    pub fn item_to_percentage(&self, item: &T) -> Option<u8> {
        let position = self.position(item)?;
        let percentage = (position + 1) * 100 / self.values.len();
        Some(u8::try_from(percentage).unwrap_or(100))
    }
}

impl OrderedScale<u32> {
    /// Creates a numeric scale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyScale`] if `values` is empty, or
    /// [`ConfigError::UnorderedScale`] if it is not strictly increasing.
    pub fn numeric(name: &str, values: Vec<u32>) -> Result<Self, ConfigError> {
        if let Some(position) = values.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::UnorderedScale {
                scale: name.to_string(),
                position: position + 1,
            });
        }
        Self::new(name, values)
    }

    /// Returns the index of the level closest to `value`.
    ///
    /// See [`closest_match_index`] for the tie-breaking rule.
    #[must_use]
    pub fn closest_index(&self, value: Option<u32>) -> usize {
        closest_match_index(value, &self.values)
    }

    /// Returns the level closest to `value`.
    ///
    /// See [`closest_match_value`] for the tie-breaking rule.
    #[must_use]
    pub fn closest_value(&self, value: Option<f64>) -> Option<u32> {
        closest_match_value(value, &self.values)
    }

    /// Plans the relative presses needed to move from `current` to `target`.
    ///
    /// Both values are first snapped to levels with [`closest_match_index`].
    #[must_use]
    pub fn step_plan(&self, current: Option<u32>, target: u32) -> StepPlan {
        StepPlan::between(
            self.closest_index(current),
            self.closest_index(Some(target)),
            self.len(),
        )
    }
}

impl<'a, T> IntoIterator for &'a OrderedScale<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_index_prefers_higher_on_tie() {
        assert_eq!(closest_match_index(Some(4), &[1, 3, 5, 7]), 2);
        assert_eq!(closest_match_index(Some(2), &[1, 3, 5, 7]), 1);
    }

    #[test]
    fn closest_index_prefers_strictly_closer_lower_entry() {
        assert_eq!(closest_match_index(Some(60), &[25, 50, 75, 100]), 1);
        assert_eq!(closest_match_index(Some(70), &[25, 50, 75, 100]), 2);
    }

    #[test]
    fn closest_index_out_of_range() {
        assert_eq!(closest_match_index(Some(8), &[1, 3, 5, 7]), 3);
        assert_eq!(closest_match_index(Some(7), &[1, 3, 5, 7]), 3);
        assert_eq!(closest_match_index(Some(0), &[1, 3, 5, 7]), 0);
    }

    #[test]
    fn closest_index_absent_value_counts_as_zero() {
        assert_eq!(closest_match_index(None, &[1, 3, 5, 7]), 0);
        assert_eq!(closest_match_index(None, &[0, 10]), 0);
    }

    #[test]
    fn closest_index_empty_scale() {
        assert_eq!(closest_match_index(Some(5), &[]), 0);
    }

    #[test]
    fn closest_value_prefers_first_on_tie() {
        assert_eq!(closest_match_value(Some(4.0), &[1_u32, 3, 5, 7]), Some(3));
        assert_eq!(closest_match_value(Some(6.0), &[7_u32, 5]), Some(7));
    }

    #[test]
    fn closest_value_picks_minimum_distance() {
        assert_eq!(
            closest_match_value(Some(4100.0), &[2700_u32, 3000, 4000, 6500]),
            Some(4000)
        );
        assert_eq!(closest_match_value(Some(-5.0), &[1_u32, 3]), Some(1));
    }

    #[test]
    fn closest_value_no_match() {
        assert_eq!(closest_match_value::<u32>(None, &[1, 3]), None);
        assert_eq!(closest_match_value::<u32>(Some(1.0), &[]), None);
    }

    #[test]
    fn precision_round_steps() {
        assert_eq!(precision_round(20.74, 0.5), Some(20.5));
        assert_eq!(precision_round(20.75, 0.5), Some(21.0));
        assert_eq!(precision_round(20.44, 0.1), Some(20.4));
        assert_eq!(precision_round(20.5, 1.0), Some(21.0));
        assert_eq!(precision_round(17.0, 2.0), Some(18.0));
        assert_eq!(precision_round(12.0, 5.9), Some(10.0));
        assert_eq!(precision_round(20.0, 0.0), None);
    }

    #[test]
    fn scale_rejects_empty() {
        let err = OrderedScale::<String>::new("speed", Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyScale {
                scale: "speed".to_string()
            }
        );
    }

    #[test]
    fn numeric_scale_must_increase() {
        let err = OrderedScale::numeric("brightness", vec![10, 20, 20, 30]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnorderedScale {
                scale: "brightness".to_string(),
                position: 2,
            }
        );
        assert!(OrderedScale::numeric("brightness", vec![10]).is_ok());
    }

    #[test]
    fn percentage_round_trip_over_labels() {
        let speeds = OrderedScale::new(
            "speed",
            vec!["low".to_string(), "medium".to_string(), "high".to_string()],
        )
        .unwrap();

        assert_eq!(speeds.item_to_percentage(&"low".to_string()), Some(33));
        assert_eq!(speeds.item_to_percentage(&"medium".to_string()), Some(66));
        assert_eq!(speeds.item_to_percentage(&"high".to_string()), Some(100));
        assert_eq!(speeds.item_to_percentage(&"turbo".to_string()), None);

        assert_eq!(speeds.percentage_to_item(1), "low");
        assert_eq!(speeds.percentage_to_item(33), "low");
        assert_eq!(speeds.percentage_to_item(34), "medium");
        assert_eq!(speeds.percentage_to_item(67), "high");
        assert_eq!(speeds.percentage_to_item(100), "high");
    }

    #[test]
    fn boundaries() {
        let scale = OrderedScale::numeric("ct", vec![2700, 4000, 6500]).unwrap();
        assert!(scale.is_boundary(0));
        assert!(!scale.is_boundary(1));
        assert!(scale.is_boundary(2));
        assert_eq!(*scale.first(), 2700);
        assert_eq!(*scale.last(), 6500);
    }
}
