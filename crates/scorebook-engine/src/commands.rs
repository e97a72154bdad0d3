//! Command implementations. Each returns the JSON documents to print, one
//! per output line, so they can be exercised without a terminal.

use scorebook_core::config::GameConfig;
use scorebook_core::{Aggregate, Game, InningState, TeamLineup, Tracked};
use scorebook_types::{AggregateKind, InningStateId};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::cli::Command;
use crate::error::EngineError;
use crate::stores::Stores;

/// Run one command against the connected stores, applying the configured
/// game rules to anything it creates.
pub async fn run(
    command: &Command,
    stores: &Stores,
    game: &GameConfig,
) -> Result<Vec<Value>, EngineError> {
    match command {
        Command::Migrate => Ok(vec![json!({ "migrated": true })]),
        Command::OpenInning { game_id } => open_inning(stores, game, *game_id)
            .await
            .map(|v| vec![v]),
        Command::Replay { kind, id } => replay(stores, *kind, *id).await.map(|v| vec![v]),
        Command::Snapshot { kind, id } => snapshot(stores, *kind, *id).await.map(|v| vec![v]),
        Command::Events {
            id,
            after,
            group,
            kinds,
            since,
        } => {
            let events = if *group {
                let filter = (!kinds.is_empty()).then_some(kinds.as_slice());
                stores
                    .events()
                    .get_events_by_aggregate_group(*id, filter, *since)
                    .await?
            } else {
                stores.events().get_events(*id, *after).await?
            };
            info!(id = %id, group, count = events.len(), "Read events");
            events
                .iter()
                .map(|event| serde_json::to_value(event).map_err(EngineError::from))
                .collect()
        }
    }
}

/// Rebuild one aggregate. An inning stream is reported as its current
/// situation; the other kinds as their full state.
async fn replay(stores: &Stores, kind: AggregateKind, id: Uuid) -> Result<Value, EngineError> {
    let value = match kind {
        AggregateKind::Game => serde_json::to_value(find::<Game>(stores, id).await?)?,
        AggregateKind::TeamLineup => serde_json::to_value(find::<TeamLineup>(stores, id).await?)?,
        AggregateKind::InningState => {
            let inning = find::<InningState>(stores, id).await?;
            serde_json::to_value(inning.current_situation())?
        }
    };
    Ok(value)
}

/// Rebuild one aggregate and force-write its snapshot.
async fn snapshot(stores: &Stores, kind: AggregateKind, id: Uuid) -> Result<Value, EngineError> {
    let version = match kind {
        AggregateKind::Game => write_snapshot::<Game>(stores, id).await?,
        AggregateKind::TeamLineup => write_snapshot::<TeamLineup>(stores, id).await?,
        AggregateKind::InningState => write_snapshot::<InningState>(stores, id).await?,
    };
    info!(stream_id = %id, aggregate_kind = %kind, version, "Snapshot written");
    Ok(json!({
        "aggregateId": id,
        "aggregateKind": kind,
        "version": version,
    }))
}

/// Create and save a new inning state for an existing game.
async fn open_inning(
    stores: &Stores,
    config: &GameConfig,
    game_id: Uuid,
) -> Result<Value, EngineError> {
    let game = find::<Game>(stores, game_id).await?;
    let mut inning = Tracked::from_outcome(InningState::create_with_order_size(
        InningStateId::new(),
        game.id(),
        config.batting_order_size,
    )?);
    stores.repository::<InningState>().save(&mut inning).await?;

    let state = inning.state();
    info!(
        game_id = %game_id,
        inning_state_id = %state.stream_id(),
        batting_order_size = state.batting_order_size(),
        "Inning state opened"
    );
    Ok(json!({
        "inningStateId": state.stream_id(),
        "gameId": game_id,
        "battingOrderSize": state.batting_order_size(),
        "version": state.version(),
    }))
}

async fn find<A: Aggregate>(stores: &Stores, id: Uuid) -> Result<A, EngineError> {
    stores
        .repository::<A>()
        .find_by_id(id)
        .await?
        .ok_or(EngineError::NotFound { kind: A::kind(), id })
}

async fn write_snapshot<A: Aggregate>(stores: &Stores, id: Uuid) -> Result<u64, EngineError> {
    let repository = stores.repository::<A>();
    if !repository.snapshots_enabled() {
        return Err(EngineError::SnapshotsDisabled);
    }
    let state = find::<A>(stores, id).await?;
    repository.write_snapshot(&state).await?;
    Ok(state.version())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use scorebook_db::SnapshotPolicy;
    use scorebook_types::{AtBatResultType, GameId, PlayerId, TeamLineupId, TeamSide};

    use super::*;

    async fn seeded(stores: &Stores) -> (Uuid, Uuid) {
        let game_id = GameId::new();
        let mut game =
            Tracked::from_outcome(Game::create_new(game_id, "Opener", "Robins", "Jays").unwrap());
        game.execute(|g| g.start(TeamLineupId::new(), TeamLineupId::new()))
            .unwrap();
        stores.repository::<Game>().save(&mut game).await.unwrap();

        let mut inning = Tracked::from_outcome(
            InningState::create_new(InningStateId::new(), game_id).unwrap(),
        );
        for result in [AtBatResultType::Double, AtBatResultType::Strikeout] {
            let slot = inning.state().current_batting_slot();
            inning
                .execute(|s| s.record_at_bat(PlayerId::new(), slot, result, 1))
                .unwrap();
        }
        stores
            .repository::<InningState>()
            .save(&mut inning)
            .await
            .unwrap();
        (game_id.into_inner(), inning.state().stream_id())
    }

    #[tokio::test]
    async fn replay_inning_reports_the_situation() {
        let stores = Stores::in_memory(None);
        let (_, inning_id) = seeded(&stores).await;
        let out = run(
            &Command::Replay {
                kind: AggregateKind::InningState,
                id: inning_id,
            },
            &stores,
            &GameConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(out.len(), 1);
        let situation: scorebook_core::Situation = serde_json::from_value(out[0].clone()).unwrap();
        assert_eq!(situation.outs, 1);
        assert_eq!(situation.batting_slot, 3);
        assert_eq!(situation.batting_side, TeamSide::Away);
        assert_eq!(situation.runners_in_scoring_position.len(), 1);
    }

    #[tokio::test]
    async fn replay_of_missing_stream_is_not_found() {
        let stores = Stores::in_memory(None);
        let error = run(
            &Command::Replay {
                kind: AggregateKind::Game,
                id: Uuid::now_v7(),
            },
            &stores,
            &GameConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, EngineError::NotFound { kind: AggregateKind::Game, .. }));
    }

    #[tokio::test]
    async fn snapshot_requires_a_snapshot_store() {
        let stores = Stores::in_memory(None);
        let (game_id, _) = seeded(&stores).await;
        let command = Command::Snapshot {
            kind: AggregateKind::Game,
            id: game_id,
        };
        assert!(matches!(
            run(&command, &stores, &GameConfig::default()).await,
            Err(EngineError::SnapshotsDisabled)
        ));

        let stores = Stores::in_memory(Some(SnapshotPolicy::every(1000)));
        let (game_id, _) = seeded(&stores).await;
        let out = run(
            &Command::Snapshot {
                kind: AggregateKind::Game,
                id: game_id,
            },
            &stores,
            &GameConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(out[0]["version"], 2);
    }

    #[tokio::test]
    async fn events_by_group_spans_streams() {
        let stores = Stores::in_memory(None);
        let (game_id, inning_id) = seeded(&stores).await;

        let group = Command::Events {
            id: game_id,
            after: None,
            group: true,
            kinds: Vec::new(),
            since: None,
        };
        let all = run(&group, &stores, &GameConfig::default()).await.unwrap();

        let single = Command::Events {
            id: inning_id,
            after: Some(1),
            group: false,
            kinds: Vec::new(),
            since: None,
        };
        let tail = run(&single, &stores, &GameConfig::default()).await.unwrap();
        let inning_len = stores.events().get_events(inning_id, None).await.unwrap().len();

        assert_eq!(all.len(), inning_len + 2);
        assert_eq!(tail.len(), inning_len - 1);

        let only_games = Command::Events {
            id: game_id,
            after: None,
            group: true,
            kinds: vec![AggregateKind::Game],
            since: None,
        };
        assert_eq!(run(&only_games, &stores, &GameConfig::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn open_inning_uses_the_configured_order_size() {
        let stores = Stores::in_memory(None);
        let (game_id, _) = seeded(&stores).await;
        let rules = GameConfig {
            batting_order_size: 10,
        };
        let out = run(&Command::OpenInning { game_id }, &stores, &rules)
            .await
            .unwrap();
        assert_eq!(out[0]["battingOrderSize"], 10);
        assert_eq!(out[0]["version"], 1);

        let inning_id: Uuid = serde_json::from_value(out[0]["inningStateId"].clone()).unwrap();
        let inning = find::<InningState>(&stores, inning_id).await.unwrap();
        assert_eq!(inning.batting_order_size(), 10);
        assert_eq!(inning.game_id().into_inner(), game_id);

        // The tenth batter bats before the order wraps back to slot 1.
        let mut tracked = Tracked::loaded(inning);
        for _ in 0..9 {
            let slot = tracked.state().current_batting_slot();
            tracked
                .execute(|s| s.record_at_bat(PlayerId::new(), slot, AtBatResultType::Walk, 1))
                .unwrap();
        }
        assert_eq!(tracked.state().current_batting_slot(), 10);
    }

    #[tokio::test]
    async fn open_inning_needs_an_existing_game() {
        let stores = Stores::in_memory(None);
        let error = run(
            &Command::OpenInning {
                game_id: Uuid::now_v7(),
            },
            &stores,
            &GameConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, EngineError::NotFound { kind: AggregateKind::Game, .. }));
    }
}
