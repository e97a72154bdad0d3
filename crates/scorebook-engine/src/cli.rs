//! Command-line surface of the engine binary.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use scorebook_types::AggregateKind;
use uuid::Uuid;

/// Operator tool for Scorebook event streams.
#[derive(Debug, Parser)]
#[command(name = "scorebook-engine")]
#[command(about = "Rebuild, snapshot, and inspect Scorebook event streams")]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Engine subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Apply pending database migrations and exit
    Migrate,
    /// Rebuild an aggregate and print its state as JSON
    Replay {
        /// Aggregate kind (game, lineup, inning)
        #[arg(value_parser = parse_kind)]
        kind: AggregateKind,
        /// Stream id
        id: Uuid,
    },
    /// Rebuild an aggregate and force-write a snapshot of it
    Snapshot {
        /// Aggregate kind (game, lineup, inning)
        #[arg(value_parser = parse_kind)]
        kind: AggregateKind,
        /// Stream id
        id: Uuid,
    },
    /// Start tracking innings for an existing game, using the configured
    /// batting order size
    OpenInning {
        /// Game stream id
        game_id: Uuid,
    },
    /// Print stored events as JSON lines
    Events {
        /// Stream id, or game id with `--group`
        id: Uuid,
        /// Only events after this stream version
        #[arg(long, conflicts_with = "group")]
        after: Option<u64>,
        /// Treat the id as a game and print every stream of that game
        #[arg(long)]
        group: bool,
        /// With `--group`, only streams of this kind (repeatable)
        #[arg(long = "kind", value_parser = parse_kind, requires = "group")]
        kinds: Vec<AggregateKind>,
        /// With `--group`, only events at or after this RFC 3339 instant
        #[arg(long, requires = "group")]
        since: Option<DateTime<Utc>>,
    },
}

/// Accepts the stored kind name in any case, plus the short forms
/// `lineup` and `inning`.
fn parse_kind(raw: &str) -> Result<AggregateKind, String> {
    let lowered = raw.to_ascii_lowercase();
    match lowered.as_str() {
        "lineup" | "team-lineup" => Ok(AggregateKind::TeamLineup),
        "inning" | "inning-state" => Ok(AggregateKind::InningState),
        _ => AggregateKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| format!("unknown aggregate kind `{raw}` (game, lineup, inning)")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_with_short_kind() {
        let id = Uuid::now_v7();
        let cli = Cli::try_parse_from(["scorebook-engine", "replay", "inning", &id.to_string()])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Replay {
                kind: AggregateKind::InningState,
                id
            }
        );
    }

    #[test]
    fn stored_kind_names_are_accepted() {
        assert_eq!(parse_kind("TeamLineup").unwrap(), AggregateKind::TeamLineup);
        assert_eq!(parse_kind("game").unwrap(), AggregateKind::Game);
        assert!(parse_kind("umpire").is_err());
    }

    #[test]
    fn kind_filter_requires_group() {
        let id = Uuid::now_v7().to_string();
        assert!(
            Cli::try_parse_from(["scorebook-engine", "events", &id, "--kind", "game"]).is_err()
        );
        let cli = Cli::try_parse_from([
            "scorebook-engine",
            "events",
            &id,
            "--group",
            "--kind",
            "inning",
            "--kind",
            "game",
        ])
        .unwrap();
        let Command::Events { group, kinds, .. } = cli.command else {
            unreachable!("parsed as events");
        };
        assert!(group);
        assert_eq!(kinds, vec![AggregateKind::InningState, AggregateKind::Game]);
    }

    #[test]
    fn parses_open_inning() {
        let id = Uuid::now_v7();
        let cli = Cli::try_parse_from(["scorebook-engine", "open-inning", &id.to_string()]).unwrap();
        assert_eq!(cli.command, Command::OpenInning { game_id: id });
        assert!(Cli::try_parse_from(["scorebook-engine", "open-inning"]).is_err());
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!(Cli::try_parse_from(["scorebook-engine", "replay", "game", "not-a-uuid"]).is_err());
    }
}
