// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Holder of the current appointment index.
//!
//! Every refresh is tagged with a generation when it starts. A refresh
//! result is installed only if no later refresh has started in the
//! meantime; otherwise it is dropped.

use crate::collaborators::{
    AppointmentFilters, AppointmentPage, AppointmentRepository, RepositoryError,
};
use crate::wire::{AppointmentRecord, IndexBuild, index_from_records};
use clinicops_domain::{Appointment, AppointmentId, AppointmentIndex, Tz};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Identifies one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// What happened to a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result replaced the index.
    Applied {
        /// Appointments now in the index.
        loaded: usize,
        /// Records left out as malformed.
        rejected: usize,
    },
    /// A later refresh started first; the result was dropped.
    Superseded,
}

#[derive(Debug)]
struct StoreState {
    index: Arc<AppointmentIndex>,
    generation: u64,
    rejected: usize,
}

/// Shared handle to the calendar's appointment index.
#[derive(Debug, Clone)]
pub struct IndexStore {
    time_zone: Tz,
    state: Arc<Mutex<StoreState>>,
}

impl IndexStore {
    /// Creates a store holding an empty index.
    #[must_use]
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            state: Arc::new(Mutex::new(StoreState {
                index: Arc::new(AppointmentIndex::empty(time_zone)),
                generation: 0,
                rejected: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Returns the current index.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppointmentIndex> {
        Arc::clone(&self.lock().index)
    }

    /// Returns the generation of the most recently started refresh.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Returns how many records the installed index left out.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.lock().rejected
    }

    /// Starts a refresh, superseding any refresh already in flight.
    #[must_use]
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut state: MutexGuard<'_, StoreState> = self.lock();
        state.generation += 1;
        RefreshTicket(state.generation)
    }

    /// Installs a refresh result if its ticket is still the latest.
    pub fn complete_refresh(&self, ticket: RefreshTicket, build: IndexBuild) -> RefreshOutcome {
        let mut state: MutexGuard<'_, StoreState> = self.lock();
        if ticket.0 != state.generation {
            warn!(
                generation = ticket.0,
                current = state.generation,
                "Discarding superseded calendar refresh"
            );
            return RefreshOutcome::Superseded;
        }

        let loaded: usize = build.index.len();
        state.index = Arc::new(build.index);
        state.rejected = build.rejected;
        debug!(generation = ticket.0, loaded, rejected = build.rejected, "Calendar refreshed");
        RefreshOutcome::Applied {
            loaded,
            rejected: build.rejected,
        }
    }

    /// Installs an index built from records, superseding any refresh in flight.
    pub fn replace(&self, records: impl IntoIterator<Item = AppointmentRecord>) -> RefreshOutcome {
        let ticket: RefreshTicket = self.begin_refresh();
        self.complete_refresh(ticket, index_from_records(records, self.time_zone))
    }

    /// Drops an appointment whose deletion the repository has confirmed.
    pub fn remove(&self, id: AppointmentId) -> Option<Appointment> {
        let mut state: MutexGuard<'_, StoreState> = self.lock();
        Arc::make_mut(&mut state.index).remove(id)
    }

    /// Reloads every page of appointments from the repository.
    ///
    /// The refresh is registered before the returned future is first
    /// polled, so of two refreshes the one created last always wins.
    ///
    /// # Errors
    ///
    /// Returns the repository error if any page fails. The installed index
    /// is left unchanged in that case. A failed refresh that a later one has
    /// already superseded reports `Superseded` instead.
    pub fn refresh<'r, R: AppointmentRepository>(
        &self,
        repository: &'r R,
        filters: &AppointmentFilters,
        page_size: u32,
    ) -> impl Future<Output = Result<RefreshOutcome, RepositoryError>> + use<'r, R> {
        let ticket: RefreshTicket = self.begin_refresh();
        let store: Self = self.clone();
        let filters: AppointmentFilters = filters.clone();

        async move {
            match fetch_all_pages(repository, &filters, page_size).await {
                Ok(records) => {
                    let build: IndexBuild = index_from_records(records, store.time_zone);
                    Ok(store.complete_refresh(ticket, build))
                }
                Err(err) if store.is_stale(ticket) => {
                    debug!(
                        generation = ticket.0,
                        error = %err,
                        "Ignoring failure of superseded calendar refresh"
                    );
                    Ok(RefreshOutcome::Superseded)
                }
                Err(err) => Err(err),
            }
        }
    }

    fn is_stale(&self, ticket: RefreshTicket) -> bool {
        ticket.0 != self.lock().generation
    }
}

async fn fetch_all_pages<R: AppointmentRepository>(
    repository: &R,
    filters: &AppointmentFilters,
    page_size: u32,
) -> Result<Vec<AppointmentRecord>, RepositoryError> {
    let mut records: Vec<AppointmentRecord> = Vec::new();
    let mut page: u32 = 1;

    loop {
        let response: AppointmentPage = repository.list(&filters.with_page(page, page_size)).await?;
        let received: usize = response.items.len();
        records.extend(response.items);

        if received == 0 || !response.pagination.has_more() {
            break;
        }
        page += 1;
    }

    Ok(records)
}
