// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Appointment lifecycle.
//!
//! `scheduled` is the only initial status. The dedicated transitions
//! (reschedule, complete, no-show, cancel) apply only to a `scheduled`
//! appointment; the generic update may set any status directly.

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{CANCEL_REASON_KEY, apply, validate_create};
pub use command::{Command, LifecycleAction};
pub use error::CoreError;
pub use state::{LifecycleEvent, TransitionResult};
