//! Repository behaviour against the in-memory stores.
//!
//! These run with plain `cargo test`; no services are needed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use scorebook_core::{Aggregate, Game, InningState, TeamLineup, Tracked, snapshot_of};
use scorebook_db::{
    DbError, EventSourcedRepository, EventStore, InMemoryEventStore, InMemorySnapshotStore,
    RepositoryErrorKind, SnapshotPolicy, SnapshotStore,
};
use scorebook_events::{EventMetadata, Snapshot, UncommittedEvent};
use scorebook_types::{
    AggregateKind, AtBatResultType, EventId, FieldPosition, GameId, InningStateId, PlayerId,
    TeamLineupId, TeamSide,
};
use uuid::Uuid;

// =============================================================================
// Helpers
// =============================================================================

fn new_inning() -> Tracked<InningState> {
    let outcome = InningState::create_new(InningStateId::new(), GameId::new()).unwrap();
    Tracked::from_outcome(outcome)
}

/// Record `n` at-bats cycling through a fixed set of results.
fn play(tracked: &mut Tracked<InningState>, n: usize) {
    let results = [
        AtBatResultType::Single,
        AtBatResultType::Strikeout,
        AtBatResultType::Walk,
        AtBatResultType::Double,
        AtBatResultType::FlyOut,
        AtBatResultType::GroundOut,
        AtBatResultType::HomeRun,
    ];
    for result in results.iter().cycle().take(n) {
        let slot = tracked.state().current_batting_slot();
        let inning = tracked.state().inning();
        tracked
            .execute(|state| state.record_at_bat(PlayerId::new(), slot, *result, inning))
            .unwrap();
    }
}

fn raw_event(event_type: &str, group_id: Uuid) -> UncommittedEvent {
    UncommittedEvent {
        event_id: EventId::new(),
        event_type: event_type.to_owned(),
        group_id,
        payload: serde_json::json!({ "eventType": event_type }),
        schema_version: 2,
        occurred_at: chrono::Utc::now(),
        metadata: EventMetadata::new("test"),
    }
}

/// A snapshot store that refuses every call and counts them.
#[derive(Default)]
struct BrokenSnapshots {
    calls: AtomicUsize,
}

#[async_trait]
impl SnapshotStore for BrokenSnapshots {
    async fn get_snapshot(
        &self,
        _aggregate_id: Uuid,
        _aggregate_kind: AggregateKind,
    ) -> Result<Option<Snapshot>, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DbError::Config("snapshot cache offline".to_owned()))
    }

    async fn save_snapshot(&self, _snapshot: &Snapshot) -> Result<(), DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DbError::Config("snapshot cache offline".to_owned()))
    }
}

// =============================================================================
// Save / load
// =============================================================================

#[tokio::test]
async fn save_then_find_rebuilds_the_same_state() {
    let store = Arc::new(InMemoryEventStore::new());
    let repo = EventSourcedRepository::<InningState>::new(store.clone());

    let mut tracked = new_inning();
    play(&mut tracked, 12);
    let version = repo.save(&mut tracked).await.unwrap();

    assert!(tracked.pending().is_empty());
    assert_eq!(version, tracked.state().version());

    let id = tracked.state().stream_id();
    let loaded = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(&loaded, tracked.state());
    assert_eq!(
        u64::try_from(store.get_events(id, None).await.unwrap().len()).unwrap(),
        loaded.version()
    );
}

#[tokio::test]
async fn missing_stream_is_not_found() {
    let repo = EventSourcedRepository::<TeamLineup>::new(Arc::new(InMemoryEventStore::new()));
    let id = Uuid::now_v7();
    assert!(repo.find_by_id(id).await.unwrap().is_none());
    let error = repo.load(id).await.unwrap_err();
    assert_eq!(error.kind(), RepositoryErrorKind::NotFound);
}

#[tokio::test]
async fn saving_twice_appends_only_new_events() {
    let repo = EventSourcedRepository::<InningState>::new(Arc::new(InMemoryEventStore::new()));
    let mut tracked = new_inning();
    repo.save(&mut tracked).await.unwrap();
    play(&mut tracked, 3);
    assert_eq!(tracked.expected_version(), 1);
    let version = repo.save(&mut tracked).await.unwrap();
    assert_eq!(version, tracked.state().version());

    // Nothing pending: a no-op.
    assert_eq!(repo.save(&mut tracked).await.unwrap(), version);
}

#[tokio::test]
async fn stale_aggregate_gets_a_conflict_and_keeps_pending_events() {
    let repo = EventSourcedRepository::<InningState>::new(Arc::new(InMemoryEventStore::new()));
    let mut original = new_inning();
    repo.save(&mut original).await.unwrap();
    let id = original.state().stream_id();

    let mut first = repo.load(id).await.unwrap();
    let mut second = repo.load(id).await.unwrap();
    play(&mut first, 1);
    play(&mut second, 2);

    repo.save(&mut first).await.unwrap();
    let error = repo.save(&mut second).await.unwrap_err();
    assert_eq!(error.kind(), RepositoryErrorKind::ConcurrencyConflict);
    assert!(!second.pending().is_empty());

    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(&stored, first.state());
}

// =============================================================================
// Concurrent appends on one stream
// =============================================================================

#[tokio::test]
async fn concurrent_appends_have_exactly_one_winner() {
    let store = Arc::new(InMemoryEventStore::new());
    let stream = Uuid::now_v7();
    let group = Uuid::now_v7();
    store
        .append(
            stream,
            AggregateKind::Game,
            vec![raw_event("GameCreated", group)],
            Some(0),
        )
        .await
        .unwrap();

    let a = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .append(
                    stream,
                    AggregateKind::Game,
                    vec![raw_event("GameStarted", group)],
                    Some(1),
                )
                .await
        })
    };
    let b = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .append(
                    stream,
                    AggregateKind::Game,
                    vec![
                        raw_event("ScoreUpdated", group),
                        raw_event("ScoreUpdated", group),
                    ],
                    Some(1),
                )
                .await
        })
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert!(a.is_ok() != b.is_ok(), "exactly one append must win");
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(
        loser,
        Err(DbError::ConcurrencyConflict { expected: 1, .. })
    ));

    let events = store.get_events(stream, None).await.unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert!(
        types == ["GameCreated", "GameStarted"]
            || types == ["GameCreated", "ScoreUpdated", "ScoreUpdated"],
        "unexpected stream {types:?}"
    );
}

// =============================================================================
// Snapshots
// =============================================================================

#[tokio::test]
async fn save_crossing_the_interval_writes_a_snapshot() {
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let repo = EventSourcedRepository::<InningState>::new(Arc::new(InMemoryEventStore::new()))
        .with_snapshots(snapshots.clone(), SnapshotPolicy::every(10));

    let mut tracked = new_inning();
    repo.save(&mut tracked).await.unwrap();
    assert!(snapshots.is_empty().await);

    play(&mut tracked, 12);
    repo.save(&mut tracked).await.unwrap();
    let id = tracked.state().stream_id();
    let snapshot = snapshots
        .get_snapshot(id, AggregateKind::InningState)
        .await
        .unwrap()
        .expect("snapshot after crossing the interval");
    assert_eq!(snapshot.version, tracked.state().version());
}

#[tokio::test]
async fn snapshot_load_matches_full_replay() {
    let events = Arc::new(InMemoryEventStore::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let with_snapshots = EventSourcedRepository::<InningState>::new(events.clone())
        .with_snapshots(snapshots.clone(), SnapshotPolicy::every(5));
    let plain = EventSourcedRepository::<InningState>::new(events.clone());

    let mut tracked = new_inning();
    play(&mut tracked, 6);
    with_snapshots.save(&mut tracked).await.unwrap();
    play(&mut tracked, 2);
    plain.save(&mut tracked).await.unwrap();

    let id = tracked.state().stream_id();
    let snapshot = snapshots
        .get_snapshot(id, AggregateKind::InningState)
        .await
        .unwrap()
        .unwrap();
    assert!(snapshot.version < tracked.state().version());

    let fast = with_snapshots.find_by_id(id).await.unwrap().unwrap();
    let slow = plain.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(fast, slow);
    assert_eq!(&fast, tracked.state());
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_replay() {
    let events = Arc::new(InMemoryEventStore::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let repo = EventSourcedRepository::<InningState>::new(events.clone())
        .with_snapshots(snapshots.clone(), SnapshotPolicy::every(1000));

    let mut tracked = new_inning();
    play(&mut tracked, 4);
    repo.save(&mut tracked).await.unwrap();
    let id = tracked.state().stream_id();

    snapshots
        .save_snapshot(&Snapshot {
            aggregate_id: id,
            aggregate_kind: AggregateKind::InningState,
            version: 2,
            state: serde_json::json!({ "not": "an inning" }),
            taken_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let loaded = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(&loaded, tracked.state());
}

#[tokio::test]
async fn snapshot_without_later_events_still_loads() {
    let events = Arc::new(InMemoryEventStore::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let repo = EventSourcedRepository::<InningState>::new(events.clone())
        .with_snapshots(snapshots.clone(), SnapshotPolicy::every(1000));

    let mut tracked = new_inning();
    play(&mut tracked, 5);
    repo.save(&mut tracked).await.unwrap();
    let written = repo.write_snapshot(tracked.state()).await.unwrap().unwrap();
    assert_eq!(written.version, tracked.state().version());

    let loaded = repo.find_by_id(tracked.state().stream_id()).await.unwrap().unwrap();
    assert_eq!(&loaded, tracked.state());
}

#[tokio::test]
async fn snapshot_at_stream_head_is_not_trusted() {
    let events = Arc::new(InMemoryEventStore::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let repo = EventSourcedRepository::<Game>::new(events.clone())
        .with_snapshots(snapshots.clone(), SnapshotPolicy::every(1000));

    let mut game =
        Tracked::from_outcome(Game::create_new(GameId::new(), "Opener", "Robins", "Jays").unwrap());
    game.execute(|g| g.start(TeamLineupId::new(), TeamLineupId::new()))
        .unwrap();
    game.execute(|g| g.record_runs(TeamSide::Home, 2, 1)).unwrap();
    repo.save(&mut game).await.unwrap();
    let id = game.state().stream_id();
    let head = game.state().version();

    // A snapshot at the head version whose state disagrees with the log.
    let mut tampered = snapshot_of(game.state()).unwrap();
    tampered.state["score"]["home"] = serde_json::json!(99);
    assert_eq!(tampered.version, head);
    snapshots.save_snapshot(&tampered).await.unwrap();

    let loaded = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.score().home, 2);
    assert_eq!(&loaded, game.state());

    // Once events follow it, the same snapshot is the base of the load.
    game.execute(|g| g.record_runs(TeamSide::Home, 1, 2)).unwrap();
    repo.save(&mut game).await.unwrap();
    let loaded = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.score().home, 100);
    assert_eq!(loaded.version(), head + 1);
}

#[tokio::test]
async fn broken_snapshot_store_never_fails_save_or_load() {
    let broken = Arc::new(BrokenSnapshots::default());
    let repo = EventSourcedRepository::<InningState>::new(Arc::new(InMemoryEventStore::new()))
        .with_snapshots(broken.clone(), SnapshotPolicy::every(1));

    let mut tracked = new_inning();
    play(&mut tracked, 3);
    repo.save(&mut tracked).await.unwrap();
    let loaded = repo
        .find_by_id(tracked.state().stream_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&loaded, tracked.state());
    assert_eq!(broken.calls.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Forward compatibility
// =============================================================================

#[tokio::test]
async fn unknown_event_types_are_skipped_on_load() {
    let store = Arc::new(InMemoryEventStore::new());
    let repo = EventSourcedRepository::<TeamLineup>::new(store.clone());

    let outcome = TeamLineup::create_new(
        TeamLineupId::new(),
        GameId::new(),
        "Robins",
        TeamSide::Away,
    )
    .unwrap();
    let mut tracked = Tracked::from_outcome(outcome);
    let player = PlayerId::new();
    tracked
        .execute(|l| l.add_player(player, "12", "Ada", 1, FieldPosition::Pitcher))
        .unwrap();
    repo.save(&mut tracked).await.unwrap();

    let id = tracked.state().stream_id();
    let group = tracked.state().game_id().into_inner();
    store
        .append(
            id,
            AggregateKind::TeamLineup,
            vec![raw_event("PlayerEjected", group)],
            Some(2),
        )
        .await
        .unwrap();

    let loaded = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.version(), 3);
    assert_eq!(loaded.position_of(player), Some(FieldPosition::Pitcher));

    // The skipped event still counts, so the next save lines up.
    let mut tracked = Tracked::loaded(loaded);
    tracked.execute(|l| l.advance_batter(9)).unwrap();
    assert_eq!(repo.save(&mut tracked).await.unwrap(), 4);
}
