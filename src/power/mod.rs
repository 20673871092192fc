// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state reconciliation against an external sensor.
//!
//! IR is fire-and-forget: a code can be lost, or someone can use the
//! original remote. An optional power sensor (a smart plug, a current clamp)
//! tells the truth about power only. The [`PowerReconciler`] turns its
//! readings into state changes:
//!
//! | Reading | Assumed state | Result                         |
//! |---------|---------------|--------------------------------|
//! | on      | off           | on, `on_by_remote` set         |
//! | on      | on            | unchanged                      |
//! | off     | any           | off, `on_by_remote` cleared    |
//! | unknown | any           | unchanged                      |
//!
//! and verifies every transmitted power change once the sensor had time to
//! react.

mod reconciler;
mod verification;

pub use reconciler::PowerReconciler;
pub use verification::VerificationHandle;
