// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Interactive scheduling on top of the appointment lifecycle.
//!
//! This crate binds the pure lifecycle rules to the two external
//! collaborators (the appointment repository and the facility directory)
//! and keeps the client-side state a calendar needs:
//!
//! - `IndexStore` holds the calendar index and reloads it after mutations
//! - `CascadeResolver` keeps the facility and location pickers consistent
//! - `CalendarSurface` renders month, week and day grids
//! - `SchedulingCoordinator` drives the dialog from click to save

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
#![allow(clippy::multiple_crate_versions)]

mod cascade;
mod collaborators;
mod config;
mod coordinator;
mod error;
mod form;
mod selection;
mod store;
mod surface;
mod wire;

#[cfg(test)]
mod tests;

pub use cascade::{CascadeOutcome, CascadeResolver, CascadeSnapshot};
pub use collaborators::{
    AppointmentFilters, AppointmentPage, AppointmentRepository, DirectoryError,
    FacilityDirectory, FacilityStatusFilter, Pagination, RepositoryError,
};
pub use config::SchedulingConfig;
pub use coordinator::SchedulingCoordinator;
pub use error::{ErrorKind, SchedulingError};
pub use form::AppointmentForm;
pub use selection::{DialogMode, SelectionState};
pub use store::{IndexStore, RefreshOutcome, RefreshTicket};
pub use surface::{
    CalendarSurface, CalendarView, DayCell, DayColumn, MonthView, SlotCell, TimeGridView,
};
pub use wire::{
    AppointmentPatchPayload, AppointmentPayload, AppointmentRecord, IndexBuild, WireFee,
    index_from_records, parse_fee_input,
};
