// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mediates calendar clicks and dialog actions into lifecycle operations.
//!
//! Every mutation is validated locally before the repository is called and
//! is followed by a full reload of the calendar index. A failed repository
//! call leaves the index untouched and the dialog open.

use crate::cascade::{CascadeOutcome, CascadeResolver};
use crate::collaborators::{
    AppointmentFilters, AppointmentRepository, FacilityDirectory, FacilityStatusFilter,
    RepositoryError,
};
use crate::config::SchedulingConfig;
use crate::error::SchedulingError;
use crate::form::AppointmentForm;
use crate::selection::{DialogMode, SelectionState};
use crate::store::{IndexStore, RefreshOutcome};
use crate::surface::{CalendarSurface, CalendarView};
use crate::wire::{AppointmentPatchPayload, AppointmentPayload, AppointmentRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clinicops::{
    Command, LifecycleAction, LifecycleEvent, TransitionResult, apply, validate_create,
};
use clinicops_domain::{
    Appointment, AppointmentId, AppointmentIndex, AvailabilityPolicy, Clock, Direction,
    Facility, FacilityId, LocationId, NewAppointment, SlotRejection, TimeSlot, Tz, ViewType,
    local_date, local_minute, validate_location_membership, validate_location_pairing,
};
use futures::future::OptionFuture;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The scheduling dialog and calendar, bound to their collaborators.
#[derive(Debug)]
pub struct SchedulingCoordinator<R, D, C> {
    repository: R,
    directory: D,
    clock: C,
    config: SchedulingConfig,
    time_zone: Tz,
    default_start_time: NaiveTime,
    policy: AvailabilityPolicy,
    cascade: CascadeResolver,
    store: IndexStore,
    selection: SelectionState,
    facilities: Vec<Facility>,
}

impl<R, D, C> SchedulingCoordinator<R, D, C>
where
    R: AppointmentRepository,
    D: FacilityDirectory,
    C: Clock,
{
    /// Creates a coordinator showing the month of today.
    ///
    /// The index starts empty; call [`Self::refresh`] to load it.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Config` if the configuration is invalid.
    pub fn new(
        repository: R,
        directory: D,
        clock: C,
        config: SchedulingConfig,
    ) -> Result<Self, SchedulingError> {
        config.validate()?;
        let time_zone: Tz = config.time_zone()?;
        let default_start_time: NaiveTime = config.default_start_time()?;
        let today: NaiveDate = local_date(clock.now(), time_zone);

        Ok(Self {
            repository,
            directory,
            clock,
            config,
            time_zone,
            default_start_time,
            policy: AvailabilityPolicy::new(time_zone),
            cascade: CascadeResolver::new(),
            store: IndexStore::new(time_zone),
            selection: SelectionState::new(ViewType::default(), today),
            facilities: Vec::new(),
        })
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub const fn form(&self) -> Option<&AppointmentForm> {
        self.selection.form.as_ref()
    }

    /// Returns the open form for editing plain fields.
    ///
    /// Facility and location go through [`Self::select_facility`] and
    /// [`Self::select_location`] so the cascade stays consistent.
    pub const fn form_mut(&mut self) -> Option<&mut AppointmentForm> {
        self.selection.form.as_mut()
    }

    #[must_use]
    pub const fn cascade(&self) -> &CascadeResolver {
        &self.cascade
    }

    #[must_use]
    pub const fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Returns the current calendar index.
    #[must_use]
    pub fn index(&self) -> Arc<AppointmentIndex> {
        self.store.snapshot()
    }

    /// Returns the facilities loaded for the picker.
    #[must_use]
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    #[must_use]
    pub const fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    // ------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------

    pub const fn set_view(&mut self, view_type: ViewType) {
        self.selection.set_view(view_type);
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.selection.navigate(direction);
    }

    pub const fn go_to(&mut self, date: NaiveDate) {
        self.selection.go_to(date);
    }

    /// Moves the anchor to the viewer's current day.
    pub fn go_to_today(&mut self) {
        let today: NaiveDate = local_date(self.clock.now(), self.time_zone);
        self.selection.go_to(today);
    }

    /// Renders the current view.
    #[must_use]
    pub fn calendar(&self) -> CalendarView {
        let index: Arc<AppointmentIndex> = self.store.snapshot();
        CalendarSurface::new(&index, self.policy, &self.clock)
            .view(self.selection.view_type, self.selection.anchor_date)
    }

    /// Reloads every appointment into the index.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Repository` if a page fails to load.
    pub async fn refresh(&self) -> Result<RefreshOutcome, SchedulingError> {
        Ok(self.reload().await?)
    }

    fn reload(&self) -> impl Future<Output = Result<RefreshOutcome, RepositoryError>> {
        self.store.refresh(
            &self.repository,
            &AppointmentFilters::default(),
            self.config.page_size,
        )
    }

    async fn refresh_after(&self, saved: Appointment) -> Result<Appointment, SchedulingError> {
        match self.reload().await {
            Ok(_) => Ok(saved),
            Err(source) => {
                warn!(
                    appointment_id = saved.id.value(),
                    error = %source,
                    "Calendar refresh failed after a saved change"
                );
                Err(SchedulingError::IndexRefresh {
                    appointment: Box::new(saved),
                    source,
                })
            }
        }
    }

    /// Loads active facilities for the picker.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Directory` if the request fails. The
    /// previous list is kept.
    pub async fn load_facilities(&mut self) -> Result<&[Facility], SchedulingError> {
        self.facilities = self
            .directory
            .list_facilities(FacilityStatusFilter::Active)
            .await?;
        Ok(&self.facilities)
    }

    // ------------------------------------------------------------------
    // Dialog
    // ------------------------------------------------------------------

    /// Opens the dialog to book a slot.
    ///
    /// Month view passes no time; the configured default start time is used
    /// and only the day rule applies.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::SlotUnavailable` if the slot is occupied or
    /// in the past.
    pub fn open_create(
        &mut self,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<(), SchedulingError> {
        let start_time: NaiveTime = match time {
            Some(time) => {
                self.check_slot(date.and_time(time), None)?;
                time
            }
            None => {
                if !self.policy.is_day_selectable(&self.clock, date) {
                    return Err(SchedulingError::SlotUnavailable {
                        at: date.and_time(self.default_start_time),
                        reason: SlotRejection::PastDay,
                    });
                }
                self.default_start_time
            }
        };

        let form: AppointmentForm = AppointmentForm::new(
            date,
            start_time,
            self.config.default_duration_minutes,
            self.config.default_appointment_type,
        );
        debug!(%date, %start_time, "Opening appointment form");
        self.cascade.clear_facility();
        self.selection.open_create(form);
        Ok(())
    }

    /// Opens the dialog to edit an appointment.
    ///
    /// The stored facility is cascaded so its location can render, while the
    /// facility picker loads alongside.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Directory` if either load fails. The dialog
    /// stays open.
    pub async fn open_edit(&mut self, appointment: Appointment) -> Result<(), SchedulingError> {
        let facility_id: Option<FacilityId> = appointment.facility_id;
        let location_id: Option<LocationId> = appointment.location_id;
        let form: AppointmentForm = AppointmentForm::from_appointment(&appointment, self.time_zone);

        debug!(appointment_id = appointment.id.value(), "Opening appointment for edit");
        self.cascade.clear_facility();
        self.selection.open_edit(appointment, form);

        let directory: &D = &self.directory;
        let cascade: &CascadeResolver = &self.cascade;
        let cascade_load: OptionFuture<_> = facility_id
            .map(|id| cascade.select_facility(directory, id))
            .into();
        let (facilities, cascaded) = futures::join!(
            directory.list_facilities(FacilityStatusFilter::Active),
            cascade_load
        );

        let facilities_loaded: Result<(), SchedulingError> = match facilities {
            Ok(list) => {
                self.facilities = list;
                Ok(())
            }
            Err(err) => Err(err.into()),
        };

        match cascaded {
            Some(Ok(CascadeOutcome::Loaded { .. })) => self.restore_location(location_id),
            Some(Err(err)) => return Err(err.into()),
            Some(Ok(CascadeOutcome::Superseded)) | None => {}
        }

        facilities_loaded
    }

    fn restore_location(&mut self, location_id: Option<LocationId>) {
        if let Err(err) = self.cascade.select_location(location_id) {
            warn!(error = %err, "Stored location is no longer offered by its facility");
            if let Some(form) = self.selection.form.as_mut() {
                form.location_id = None;
            }
        }
    }

    /// Selects the facility on the open form and loads its locations.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::NoOpenForm` if the dialog is closed, or
    /// `SchedulingError::Directory` if the load fails.
    pub async fn select_facility(
        &mut self,
        facility_id: FacilityId,
    ) -> Result<CascadeOutcome, SchedulingError> {
        let form: &mut AppointmentForm = self
            .selection
            .form
            .as_mut()
            .ok_or(SchedulingError::NoOpenForm)?;
        if form.facility_id != Some(facility_id) {
            form.location_id = None;
        }
        form.facility_id = Some(facility_id);

        let outcome: CascadeOutcome = self
            .cascade
            .select_facility(&self.directory, facility_id)
            .await?;

        if let (CascadeOutcome::Loaded { .. }, Some(form)) = (outcome, self.selection.form.as_mut())
        {
            form.location_id = self.cascade.selected_location();
        }
        Ok(outcome)
    }

    /// Clears the facility and location on the open form.
    pub fn clear_facility(&mut self) {
        self.cascade.clear_facility();
        if let Some(form) = self.selection.form.as_mut() {
            form.facility_id = None;
            form.location_id = None;
        }
    }

    /// Selects a location of the current facility.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::UnknownLocation` if the location is not loaded.
    pub fn select_location(
        &mut self,
        location_id: Option<LocationId>,
    ) -> Result<(), SchedulingError> {
        self.cascade.select_location(location_id)?;
        if let Some(form) = self.selection.form.as_mut() {
            form.location_id = location_id;
        }
        Ok(())
    }

    /// Closes the dialog, clearing the selection and the cascade.
    pub fn close_dialog(&mut self) {
        self.selection.close_dialog();
        self.cascade.clear_facility();
    }

    /// Validates and saves the open form.
    ///
    /// Validation, location membership and slot availability are all
    /// checked before the repository is called. On success the dialog is
    /// closed and the index reloaded.
    ///
    /// # Errors
    ///
    /// Returns a validation or conflict error without calling the
    /// repository, a repository error with the dialog left open, or
    /// `SchedulingError::IndexRefresh` if the save succeeded but the reload
    /// did not.
    pub async fn submit(&mut self) -> Result<Appointment, SchedulingError> {
        let form: AppointmentForm = self
            .selection
            .form
            .clone()
            .ok_or(SchedulingError::NoOpenForm)?;
        let now: DateTime<Utc> = self.clock.now();
        self.check_location(&form)?;

        match (self.selection.dialog, self.selection.selected_event.clone()) {
            (DialogMode::Edit, Some(original)) => self.submit_edit(&form, original, now).await,
            _ => self.submit_create(&form, now).await,
        }
    }

    async fn submit_create(
        &mut self,
        form: &AppointmentForm,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let pending: NewAppointment = validate_create(form.to_draft(self.time_zone)?, now)?;
        self.check_slot(form.starts_at(), None)?;

        let record: AppointmentRecord = self
            .repository
            .create(&AppointmentPayload::from_new(&pending))
            .await?;
        self.close_dialog();
        let saved: Appointment = self.read_reply(&record).await?;
        info!(
            appointment_id = saved.id.value(),
            action = %LifecycleAction::Create,
            patient_id = saved.patient_id.value(),
            "Appointment created"
        );

        self.refresh_after(saved).await
    }

    async fn submit_edit(
        &mut self,
        form: &AppointmentForm,
        original: Appointment,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let patch = form.to_patch(&original, self.time_zone)?;
        let TransitionResult {
            appointment: updated,
            changes,
            event,
        } = apply(&original, Command::Update { patch }, now)?;

        if changes.is_empty() {
            debug!(appointment_id = original.id.value(), "Nothing to save");
            self.close_dialog();
            return Ok(original);
        }
        if updated.scheduled_at != original.scheduled_at {
            self.check_slot(form.starts_at(), Some(original.id))?;
        }

        let record: AppointmentRecord = self
            .repository
            .update(original.id, &AppointmentPatchPayload::new(changes))
            .await?;
        self.finish_transition(&event, &record).await
    }

    // ------------------------------------------------------------------
    // Status shortcuts
    // ------------------------------------------------------------------

    /// Marks a loaded appointment completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment is not loaded or not `scheduled`,
    /// or if the repository call fails.
    pub async fn complete(
        &mut self,
        id: AppointmentId,
        notes: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let original: Appointment = self.loaded(id)?;
        let result: TransitionResult = apply(
            &original,
            Command::Complete {
                notes: notes.clone(),
            },
            self.clock.now(),
        )?;
        let record: AppointmentRecord = self.repository.complete(id, notes).await?;
        self.finish_transition(&result.event, &record).await
    }

    /// Marks a loaded appointment as a no-show.
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment is not loaded or not `scheduled`,
    /// or if the repository call fails.
    pub async fn mark_no_show(
        &mut self,
        id: AppointmentId,
        notes: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let original: Appointment = self.loaded(id)?;
        let result: TransitionResult = apply(
            &original,
            Command::MarkNoShow {
                notes: notes.clone(),
            },
            self.clock.now(),
        )?;
        let record: AppointmentRecord = self.repository.mark_no_show(id, notes).await?;
        self.finish_transition(&result.event, &record).await
    }

    /// Cancels a loaded appointment.
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment is not loaded or not `scheduled`,
    /// or if the repository call fails.
    pub async fn cancel(
        &mut self,
        id: AppointmentId,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let original: Appointment = self.loaded(id)?;
        let result: TransitionResult =
            apply(&original, Command::Cancel { reason }, self.clock.now())?;
        let record: AppointmentRecord = self
            .repository
            .update(id, &AppointmentPatchPayload::new(result.changes))
            .await?;
        self.finish_transition(&result.event, &record).await
    }

    /// Moves a loaded appointment to a new start.
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment is not loaded or not `scheduled`,
    /// if the new start is not in the future or its slot is taken, or if the
    /// repository call fails.
    pub async fn reschedule(
        &mut self,
        id: AppointmentId,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let original: Appointment = self.loaded(id)?;
        let result: TransitionResult = apply(
            &original,
            Command::Reschedule { scheduled_at },
            self.clock.now(),
        )?;
        self.check_slot(local_minute(scheduled_at, self.time_zone), Some(id))?;

        let record: AppointmentRecord = self.repository.reschedule(id, scheduled_at).await?;
        self.finish_transition(&result.event, &record).await
    }

    async fn finish_transition(
        &mut self,
        event: &LifecycleEvent,
        record: &AppointmentRecord,
    ) -> Result<Appointment, SchedulingError> {
        if self.selection.editing() == Some(event.appointment_id) {
            self.close_dialog();
        }
        let saved: Appointment = self.read_reply(record).await?;
        info!(
            appointment_id = event.appointment_id.value(),
            action = %event.action,
            from = %event.from,
            to = %saved.status,
            "{}",
            event.description
        );

        self.refresh_after(saved).await
    }

    /// Converts the repository's reply to a saved mutation.
    ///
    /// An unreadable reply still reloads the calendar, since the change is
    /// already stored.
    async fn read_reply(&self, record: &AppointmentRecord) -> Result<Appointment, SchedulingError> {
        match record.to_appointment() {
            Ok(saved) => Ok(saved),
            Err(err) => {
                warn!(
                    record_id = record.id,
                    error = %err,
                    "Repository saved the change but replied with an unreadable record"
                );
                if let Err(source) = self.reload().await {
                    warn!(error = %source, "Calendar refresh failed after a saved change");
                }
                Err(SchedulingError::UnreadableReply {
                    record_id: record.id,
                    source: Box::new(err),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Asks for confirmation before deleting a loaded appointment.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::UnknownAppointment` if it is not loaded.
    pub fn request_delete(&mut self, id: AppointmentId) -> Result<(), SchedulingError> {
        self.loaded(id)?;
        self.selection.pending_delete = Some(id);
        Ok(())
    }

    /// Drops a pending delete request.
    pub const fn cancel_delete(&mut self) {
        self.selection.pending_delete = None;
    }

    /// Deletes the appointment awaiting confirmation.
    ///
    /// The appointment leaves the index once the repository confirms, and
    /// the index is then reloaded.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::NoPendingDelete` without a prior
    /// [`Self::request_delete`]. A repository failure keeps the request
    /// pending so it can be confirmed again.
    pub async fn confirm_delete(&mut self) -> Result<Appointment, SchedulingError> {
        let id: AppointmentId = self
            .selection
            .pending_delete
            .ok_or(SchedulingError::NoPendingDelete)?;
        let appointment: Appointment = self.loaded(id)?;
        let result: TransitionResult = apply(&appointment, Command::Delete, self.clock.now())?;

        self.repository.delete(id).await?;
        self.store.remove(id);
        info!(
            appointment_id = id.value(),
            action = %result.event.action,
            "Appointment deleted"
        );

        self.close_dialog();
        self.refresh_after(appointment).await
    }

    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    fn loaded(&self, id: AppointmentId) -> Result<Appointment, SchedulingError> {
        self.store
            .snapshot()
            .get(id)
            .cloned()
            .ok_or(SchedulingError::UnknownAppointment(id))
    }

    fn check_slot(
        &self,
        candidate: NaiveDateTime,
        exclude: Option<AppointmentId>,
    ) -> Result<(), SchedulingError> {
        let index: Arc<AppointmentIndex> = self.store.snapshot();
        let slot: TimeSlot = TimeSlot::containing(candidate.time());
        let occupants: Vec<&Appointment> = index
            .within_slot(candidate.date(), &slot)
            .into_iter()
            .filter(|a| Some(a.id) != exclude)
            .collect();

        self.policy
            .check(&self.clock, candidate, &occupants)
            .map_err(|reason| SchedulingError::SlotUnavailable {
                at: candidate,
                reason,
            })
    }

    fn check_location(&self, form: &AppointmentForm) -> Result<(), SchedulingError> {
        let Some(location_id) = form.location_id else {
            return Ok(());
        };
        validate_location_pairing(form.facility_id, form.location_id)?;

        if self.cascade.selected_facility() != form.facility_id {
            return Err(SchedulingError::UnknownLocation { location_id });
        }
        validate_location_membership(
            form.facility_id,
            form.location_id,
            &self.cascade.locations(),
        )?;
        Ok(())
    }
}
