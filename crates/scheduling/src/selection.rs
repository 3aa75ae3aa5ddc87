// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::form::AppointmentForm;
use chrono::NaiveDate;
use clinicops_domain::{Appointment, AppointmentId, Direction, ViewType, VisibleRange};

/// Whether the scheduling dialog is open, and for what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogMode {
    #[default]
    Closed,
    Create,
    Edit,
}

/// What the user is looking at and working on.
///
/// Closing the dialog clears the selection, the form and any pending delete.
/// The view type and anchor date survive.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub selected_date: Option<NaiveDate>,
    /// The appointment being edited.
    pub selected_event: Option<Appointment>,
    pub view_type: ViewType,
    pub anchor_date: NaiveDate,
    pub dialog: DialogMode,
    pub form: Option<AppointmentForm>,
    /// An appointment awaiting delete confirmation.
    pub pending_delete: Option<AppointmentId>,
}

impl SelectionState {
    #[must_use]
    pub const fn new(view_type: ViewType, anchor_date: NaiveDate) -> Self {
        Self {
            selected_date: None,
            selected_event: None,
            view_type,
            anchor_date,
            dialog: DialogMode::Closed,
            form: None,
            pending_delete: None,
        }
    }

    pub fn open_create(&mut self, form: AppointmentForm) {
        self.selected_date = Some(form.date);
        self.selected_event = None;
        self.pending_delete = None;
        self.dialog = DialogMode::Create;
        self.form = Some(form);
    }

    pub fn open_edit(&mut self, appointment: Appointment, form: AppointmentForm) {
        self.selected_date = Some(form.date);
        self.selected_event = Some(appointment);
        self.pending_delete = None;
        self.dialog = DialogMode::Edit;
        self.form = Some(form);
    }

    pub fn close_dialog(&mut self) {
        self.selected_date = None;
        self.selected_event = None;
        self.dialog = DialogMode::Closed;
        self.form = None;
        self.pending_delete = None;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.dialog, DialogMode::Closed)
    }

    /// Returns the id of the appointment being edited.
    #[must_use]
    pub fn editing(&self) -> Option<AppointmentId> {
        match self.dialog {
            DialogMode::Edit => self.selected_event.as_ref().map(|a| a.id),
            DialogMode::Closed | DialogMode::Create => None,
        }
    }

    pub const fn set_view(&mut self, view_type: ViewType) {
        self.view_type = view_type;
    }

    /// Moves the anchor one view-width.
    pub fn navigate(&mut self, direction: Direction) {
        self.anchor_date = self.view_type.step(self.anchor_date, direction);
    }

    pub const fn go_to(&mut self, date: NaiveDate) {
        self.anchor_date = date;
    }

    #[must_use]
    pub fn visible_range(&self) -> VisibleRange {
        VisibleRange::for_view(self.view_type, self.anchor_date)
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.view_type.title(self.anchor_date)
    }
}
