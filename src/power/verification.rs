// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable delayed power verification.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::AbortHandle;

use crate::types::PowerState;

/// Handle to a scheduled power verification.
///
/// Cancelling is idempotent and safe after the check has already run.
#[derive(Debug)]
pub struct VerificationHandle {
    expected: PowerState,
    abort: AbortHandle,
    cancelled: AtomicBool,
}

impl VerificationHandle {
    pub(crate) fn new(expected: PowerState, abort: AbortHandle) -> Self {
        Self {
            expected,
            abort,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Returns the power state the check expects to observe.
    #[must_use]
    pub fn expected(&self) -> PowerState {
        self.expected
    }

    /// Cancels the check if it has not fired yet.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.abort.abort();
        }
    }

    /// Returns `true` if the check was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `true` while the check is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_cancelled() && !self.abort.is_finished()
    }
}
