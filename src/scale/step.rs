// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relative step planning.

use std::fmt;

/// Direction of relative presses on a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDirection {
    /// Towards the last level (e.g. "brighten", "colder").
    Increase,
    /// Towards the first level (e.g. "dim", "warmer").
    Decrease,
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => f.write_str("increase"),
            Self::Decrease => f.write_str("decrease"),
        }
    }
}

/// Number and direction of relative presses between two scale levels.
///
/// When the target is the first or last level, the plan issues one press
/// per level of the scale instead of the computed difference. The physical
/// device clamps at its extremes, so this brings it back in line even if the
/// tracked level had drifted. A plan between identical levels is empty and
/// never resynchronizes.
///
/// # Examples
///
/// ```
/// use irdrive_lib::scale::{StepDirection, StepPlan};
///
/// // Middle of a 5-level scale: exact difference
/// let plan = StepPlan::between(1, 3, 5);
/// assert_eq!((plan.direction(), plan.steps()), (StepDirection::Increase, 2));
///
/// // Heading for the bottom: full range
/// let plan = StepPlan::between(3, 0, 5);
/// assert_eq!((plan.direction(), plan.steps()), (StepDirection::Decrease, 5));
///
/// // Same level: nothing to send
/// assert!(StepPlan::between(4, 4, 5).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    direction: StepDirection,
    steps: usize,
    target_index: usize,
}

impl StepPlan {
    /// Plans presses from `current_index` to `target_index` on a scale of
    /// `len` levels.
    #[must_use]
    pub fn between(current_index: usize, target_index: usize, len: usize) -> Self {
        let (direction, mut steps) = if target_index < current_index {
            (StepDirection::Decrease, current_index - target_index)
        } else {
            (StepDirection::Increase, target_index - current_index)
        };

        if steps > 0 && (target_index == 0 || target_index + 1 == len) {
            steps = len;
        }

        Self {
            direction,
            steps,
            target_index,
        }
    }

    /// Returns the press direction.
    #[must_use]
    pub fn direction(&self) -> StepDirection {
        self.direction
    }

    /// Returns the number of presses.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Returns the index of the level the plan ends on.
    #[must_use]
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Returns `true` if nothing needs to be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }
}
