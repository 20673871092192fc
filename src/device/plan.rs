// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command plans.

use crate::command::Code;
use crate::state::StateChange;
use crate::types::PowerState;

/// A code sequence plus the state it leads to.
///
/// The change is applied only once every code was transmitted.
///
/// # Examples
///
/// ```
/// use irdrive_lib::command::Code;
/// use irdrive_lib::device::CommandPlan;
/// use irdrive_lib::state::StateChange;
/// use irdrive_lib::types::PowerState;
///
/// let mut plan = CommandPlan::new();
/// plan.push(Code::new("ON"));
/// plan.push_repeated(&Code::new("BRIGHTEN"), 3);
/// plan.change(StateChange::commanded_power(PowerState::On));
///
/// assert_eq!(plan.codes().len(), 4);
/// assert_eq!(plan.power_target(), Some(PowerState::On));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    codes: Vec<Code>,
    changes: Vec<StateChange>,
}

impl CommandPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a code.
    pub fn push(&mut self, code: Code) {
        self.codes.push(code);
    }

    /// Appends `code` `count` times.
    pub fn push_repeated(&mut self, code: &Code, count: usize) {
        self.codes.extend(std::iter::repeat_n(code, count).cloned());
    }

    /// Records a state change implied by the plan.
    pub fn change(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    /// Returns the codes in transmission order.
    #[must_use]
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    /// Returns the changes as one batch.
    #[must_use]
    pub fn state_change(&self) -> StateChange {
        StateChange::batch(self.changes.clone())
    }

    /// Returns the power state the plan sets, if any.
    #[must_use]
    pub fn power_target(&self) -> Option<PowerState> {
        self.changes.iter().rev().find_map(StateChange::power_target)
    }

    /// Returns `true` if the plan sends nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
