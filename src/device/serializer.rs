// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exclusive, ordered transmission of code sequences.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::command::Code;
use crate::error::TransmissionError;
use crate::protocol::Controller;

/// Serializes code sequences for one device.
///
/// Only one sequence is in flight at a time; waiting sequences are served in
/// FIFO order. After each code the serializer pauses for the configured
/// delay so the appliance can process it.
#[derive(Debug)]
pub struct TransmissionSerializer {
    lock: Mutex<()>,
    delay: Duration,
}

/// Exclusive access to a device's transmitter.
///
/// Dropping the guard lets the next sequence start.
#[derive(Debug)]
pub struct TransmissionGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    delay: Duration,
}

impl TransmissionSerializer {
    /// Creates a serializer pausing `delay` after each code.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            lock: Mutex::new(()),
            delay,
        }
    }

    /// Returns the inter-command delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for exclusive access.
    pub async fn acquire(&self) -> TransmissionGuard<'_> {
        TransmissionGuard {
            _guard: self.lock.lock().await,
            delay: self.delay,
        }
    }

    /// Sends `codes` exclusively and runs `commit` only if all succeeded.
    ///
    /// `commit` runs while exclusivity is still held.
    ///
    /// # Errors
    ///
    /// Returns [`TransmissionError`] for the first code that failed; later
    /// codes are not sent and `commit` does not run.
    pub async fn transmit<C, F, R>(
        &self,
        controller: &C,
        codes: &[Code],
        commit: F,
    ) -> Result<R, TransmissionError>
    where
        C: Controller,
        F: FnOnce() -> R,
    {
        let guard = self.acquire().await;
        guard.send_all(controller, codes).await?;
        Ok(commit())
    }
}

impl TransmissionGuard<'_> {
    /// Sends each code in order, pausing after every one.
    ///
    /// # Errors
    ///
    /// Returns [`TransmissionError`] for the first code that failed.
    pub async fn send_all<C: Controller>(
        &self,
        controller: &C,
        codes: &[Code],
    ) -> Result<(), TransmissionError> {
        let total = codes.len();
        for (index, code) in codes.iter().enumerate() {
            tracing::debug!(code_index = index, total, code = %code, "Transmitting code");

            if let Err(source) = controller.send(code).await {
                tracing::warn!(code_index = index, total, error = %source, "Transmission failed");
                return Err(TransmissionError {
                    index,
                    total,
                    source,
                });
            }

            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }
}
