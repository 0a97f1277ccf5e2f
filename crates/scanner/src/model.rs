//! Model — wire types produced by a scan.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::serde_utils::{deserialize_tallies_from_map, serialize_tallies_as_map};

/// Statistics for one match, keyed the way the server log reports players:
/// by display name. A client that re-announces under a new name shows up as
/// a second player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Every kill event in the match, including self kills, environment
    /// kills and kill lines whose participants could not be read.
    pub total_kills: u64,

    /// Display names in first-appearance order, no duplicates.
    pub players: Vec<String>,

    /// Net kill count per registered player, same set and order as
    /// `players`. Crosses the wire as a JSON object; entries can go
    /// negative when the environment outscores a player.
    #[serde(
        serialize_with = "serialize_tallies_as_map",
        deserialize_with = "deserialize_tallies_from_map"
    )]
    pub kills: Vec<(String, i64)>,
}

impl Game {
    /// Register a display name if unseen. Returns true when the name was
    /// new; registration opens the player's tally at zero.
    pub fn add_player(&mut self, name: &str) -> bool {
        if self.players.iter().any(|p| p == name) {
            return false;
        }
        self.players.push(name.to_string());
        self.kills.push((name.to_string(), 0));
        true
    }

    /// Mutable access to a registered player's tally.
    pub fn tally_mut(&mut self, name: &str) -> Option<&mut i64> {
        self.kills
            .iter_mut()
            .find(|(player, _)| player == name)
            .map(|(_, count)| count)
    }

    /// Read a registered player's tally.
    pub fn tally(&self, name: &str) -> Option<i64> {
        self.kills
            .iter()
            .find(|(player, _)| player == name)
            .map(|(_, count)| *count)
    }
}

/// A finished match under its synthetic label (`game_1`, `game_2`, ...).
///
/// Serializes as a single-entry JSON object, `{"game_1": {...}}`, so a list
/// of these matches the wire format consumers expect.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGame {
    pub label: String,
    pub game: Game,
}

impl Serialize for LabeledGame {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.label, &self.game)?;
        map.end()
    }
}

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Lines pulled from the source.
    pub lines: u64,
    /// Matches opened, explicitly or implicitly.
    pub games_started: u64,
    /// Matches closed, whether by a shutdown marker, a new init marker or
    /// the end-of-stream flush.
    pub games_completed: u64,
    /// Player registrations that introduced a new name to a match.
    pub players_registered: u64,
    /// Readable kill lines consumed inside a match.
    pub kills: u64,
    /// In-match identity lines the extraction pattern could not read.
    pub malformed_client_lines: u64,
    /// In-match kill lines the extraction pattern could not read.
    pub malformed_kill_lines: u64,
    /// Kills naming a participant that was never registered.
    pub unknown_player_kills: u64,
    /// Matches opened by a stray line under the implicit start policy.
    pub implicit_starts: u64,
    /// Matches still open when the stream ended.
    pub flushed_open_games: u64,
}

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub games: Vec<LabeledGame>,
    pub stats: ScanStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_player_registers_once() {
        let mut game = Game::default();
        assert!(game.add_player("Isgalamido"));
        assert!(!game.add_player("Isgalamido"));
        assert_eq!(game.players, ["Isgalamido"]);
        assert_eq!(game.kills.len(), 1);
    }

    #[test]
    fn test_add_player_opens_tally_at_zero() {
        let mut game = Game::default();
        game.add_player("Zeh");
        assert_eq!(game.tally("Zeh"), Some(0));
    }

    #[test]
    fn test_players_keep_first_appearance_order() {
        let mut game = Game::default();
        game.add_player("Zeh");
        game.add_player("Assasinu Credi");
        game.add_player("Zeh");
        assert_eq!(game.players, ["Zeh", "Assasinu Credi"]);
    }

    #[test]
    fn test_tally_mut_adjusts_count() {
        let mut game = Game::default();
        game.add_player("Isgalamido");
        *game.tally_mut("Isgalamido").unwrap() += 2;
        *game.tally_mut("Isgalamido").unwrap() -= 3;
        assert_eq!(game.tally("Isgalamido"), Some(-1));
    }

    #[test]
    fn test_tally_unknown_player_is_none() {
        let mut game = Game::default();
        game.add_player("Zeh");
        assert_eq!(game.tally("Mocinha"), None);
        assert!(game.tally_mut("Mocinha").is_none());
    }

    #[test]
    fn test_empty_game_serialization() {
        let json = serde_json::to_string(&Game::default()).unwrap();
        assert_eq!(json, r#"{"totalKills":0,"players":[],"kills":{}}"#);
    }

    #[test]
    fn test_game_serialization_shape_and_order() {
        let mut game = Game::default();
        game.add_player("Isgalamido");
        game.add_player("Zeh");
        game.total_kills = 3;
        *game.tally_mut("Isgalamido").unwrap() += 1;
        let json = serde_json::to_string(&game).unwrap();
        assert_eq!(
            json,
            r#"{"totalKills":3,"players":["Isgalamido","Zeh"],"kills":{"Isgalamido":1,"Zeh":0}}"#
        );
    }

    #[test]
    fn test_negative_tally_serializes() {
        let mut game = Game::default();
        game.add_player("Mocinha");
        *game.tally_mut("Mocinha").unwrap() -= 1;
        game.total_kills = 1;
        let json = serde_json::to_string(&game).unwrap();
        assert!(json.contains(r#""Mocinha":-1"#));
    }

    #[test]
    fn test_game_round_trips_through_json() {
        let mut game = Game::default();
        game.add_player("Isgalamido");
        game.add_player("Dono da Bola");
        game.total_kills = 4;
        *game.tally_mut("Isgalamido").unwrap() += 2;
        *game.tally_mut("Dono da Bola").unwrap() -= 1;

        let json = serde_json::to_string(&game).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();
        // Tally order and negative entries survive the map codec.
        assert_eq!(back, game);
    }

    #[test]
    fn test_labeled_game_is_single_entry_object() {
        let labeled = LabeledGame {
            label: "game_1".to_string(),
            game: Game::default(),
        };
        let json = serde_json::to_string(&labeled).unwrap();
        assert_eq!(
            json,
            r#"{"game_1":{"totalKills":0,"players":[],"kills":{}}}"#
        );
    }

    #[test]
    fn test_labeled_game_list_serialization() {
        let games = vec![
            LabeledGame {
                label: "game_1".to_string(),
                game: Game::default(),
            },
            LabeledGame {
                label: "game_2".to_string(),
                game: Game::default(),
            },
        ];
        let value = serde_json::to_value(&games).unwrap();
        assert_eq!(value[0].as_object().unwrap().len(), 1);
        assert!(value[0].get("game_1").is_some());
        assert!(value[1].get("game_2").is_some());
    }

    #[test]
    fn test_scan_report_serializes_stats() {
        let report = ScanReport {
            games: Vec::new(),
            stats: ScanStats {
                lines: 7,
                ..ScanStats::default()
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["stats"]["lines"], 7);
        assert!(value["games"].as_array().unwrap().is_empty());
    }
}
