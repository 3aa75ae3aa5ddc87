// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Index reloads: paging, malformed records and supersession.

use std::sync::Arc;

use clinicops_domain::{AppointmentId, AppointmentIndex, Tz};

use crate::{
    AppointmentFilters, AppointmentRecord, IndexStore, RefreshOutcome, RefreshTicket,
    RepositoryError, index_from_records,
};

use super::helpers::{InMemoryRepository, create_test_record, date, init_tracing};

fn create_test_records(count: i64) -> Vec<AppointmentRecord> {
    (1..=count)
        .map(|id| create_test_record(id, &format!("2026-10-{:02}T09:00:00Z", 16 + id)))
        .collect()
}

#[tokio::test]
async fn test_refresh_reads_every_page() {
    init_tracing();
    let repository = InMemoryRepository::with_records(create_test_records(5));
    let store: IndexStore = IndexStore::new(Tz::UTC);

    let outcome: RefreshOutcome = store
        .refresh(&repository, &AppointmentFilters::default(), 2)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RefreshOutcome::Applied {
            loaded: 5,
            rejected: 0,
        }
    );
    assert_eq!(repository.calls(), vec!["list", "list", "list"]);
    assert_eq!(store.snapshot().len(), 5);
}

#[tokio::test]
async fn test_refresh_of_empty_collection_stops_after_first_page() {
    init_tracing();
    let repository = InMemoryRepository::with_records(Vec::new());
    let store: IndexStore = IndexStore::new(Tz::UTC);

    store
        .refresh(&repository, &AppointmentFilters::default(), 50)
        .await
        .unwrap();

    assert_eq!(repository.calls(), vec!["list"]);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_malformed_records_are_left_out() {
    init_tracing();
    let mut records: Vec<AppointmentRecord> = create_test_records(3);
    records[1].duration_minutes = 0;
    records[2].status = String::from("archived");
    let repository = InMemoryRepository::with_records(records);
    let store: IndexStore = IndexStore::new(Tz::UTC);

    let outcome: RefreshOutcome = store
        .refresh(&repository, &AppointmentFilters::default(), 100)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RefreshOutcome::Applied {
            loaded: 1,
            rejected: 2,
        }
    );
    assert_eq!(store.rejected(), 2);
    assert!(store.snapshot().get(AppointmentId::new(1)).is_some());
}

#[tokio::test]
async fn test_failed_refresh_keeps_installed_index() {
    init_tracing();
    let repository = InMemoryRepository::with_records(create_test_records(2));
    let store: IndexStore = IndexStore::new(Tz::UTC);
    store
        .refresh(&repository, &AppointmentFilters::default(), 100)
        .await
        .unwrap();

    repository.fail_lists_with(Some(RepositoryError::Transport(String::from("offline"))));
    let result: Result<RefreshOutcome, RepositoryError> = store
        .refresh(&repository, &AppointmentFilters::default(), 100)
        .await;

    assert_eq!(
        result,
        Err(RepositoryError::Transport(String::from("offline")))
    );
    assert_eq!(store.snapshot().len(), 2);
}

#[tokio::test]
async fn test_later_refresh_wins_over_earlier_one_finishing_last() {
    init_tracing();
    let stale = InMemoryRepository::with_records(create_test_records(1));
    let fresh = InMemoryRepository::with_records(create_test_records(3));
    let store: IndexStore = IndexStore::new(Tz::UTC);

    let first = store.refresh(&stale, &AppointmentFilters::default(), 100);
    let second = store.refresh(&fresh, &AppointmentFilters::default(), 100);

    assert!(matches!(
        second.await.unwrap(),
        RefreshOutcome::Applied { loaded: 3, .. }
    ));
    assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(store.snapshot().len(), 3);
}

#[tokio::test]
async fn test_superseded_refresh_failure_is_not_reported() {
    init_tracing();
    let offline = InMemoryRepository::with_records(Vec::new());
    offline.fail_lists_with(Some(RepositoryError::Transport(String::from("offline"))));
    let fresh = InMemoryRepository::with_records(create_test_records(2));
    let store: IndexStore = IndexStore::new(Tz::UTC);

    let first = store.refresh(&offline, &AppointmentFilters::default(), 100);
    let second = store.refresh(&fresh, &AppointmentFilters::default(), 100);

    assert_eq!(first.await, Ok(RefreshOutcome::Superseded));
    assert!(matches!(
        second.await.unwrap(),
        RefreshOutcome::Applied { loaded: 2, .. }
    ));
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn test_stale_ticket_is_discarded() {
    init_tracing();
    let store: IndexStore = IndexStore::new(Tz::UTC);
    let first: RefreshTicket = store.begin_refresh();
    let second: RefreshTicket = store.begin_refresh();
    assert!(second.generation() > first.generation());

    let outcome: RefreshOutcome =
        store.complete_refresh(first, index_from_records(create_test_records(2), Tz::UTC));
    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert!(store.snapshot().is_empty());

    store.complete_refresh(second, index_from_records(create_test_records(2), Tz::UTC));
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn test_remove_leaves_earlier_snapshots_intact() {
    let store: IndexStore = IndexStore::new(Tz::UTC);
    store.replace(create_test_records(2));
    let before: Arc<AppointmentIndex> = store.snapshot();

    let removed = store.remove(AppointmentId::new(1));

    assert_eq!(removed.map(|a| a.id), Some(AppointmentId::new(1)));
    assert!(store.snapshot().get(AppointmentId::new(1)).is_none());
    assert_eq!(before.len(), 2);
    assert_eq!(before.for_date(date(2026, 10, 17)).len(), 1);
    assert!(store.remove(AppointmentId::new(1)).is_none());
}
