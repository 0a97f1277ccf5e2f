//! Session — the per-scan match state machine.
//!
//! A session holds at most one match under construction plus the finished
//! matches in encounter order. Feed it lines front to back, then call
//! [`ScanSession::finish`] to flush a trailing unterminated match and take
//! the results. Labels are handed out when a match starts, so encounter
//! order and label order always agree.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::model::{Game, LabeledGame, ScanReport, ScanStats};
use crate::settings::MatchStartPolicy;

use super::event::{self, LineEvent};

/// The match currently being assembled, under its start-time label.
struct OpenGame {
    label: String,
    game: Game,
}

impl OpenGame {
    fn register_player(&mut self, stats: &mut ScanStats, name: &str) {
        if self.game.add_player(name) {
            stats.players_registered += 1;
            trace!(player = name, "player registered");
        }
    }

    fn record_kill(&mut self, stats: &mut ScanStats, killer: &str, victim: &str) {
        // Every kill counts toward the match total, whoever scored it.
        stats.kills += 1;
        self.game.total_kills += 1;

        if killer == event::WORLD {
            // Environment kills cost the victim a point. The world itself
            // is never registered as a player.
            if let Some(tally) = self.game.tally_mut(victim) {
                *tally -= 1;
            } else {
                stats.unknown_player_kills += 1;
                trace!(victim = victim, "environment kill on unregistered victim");
            }
        } else if killer != victim {
            if let Some(tally) = self.game.tally_mut(killer) {
                *tally += 1;
            } else {
                stats.unknown_player_kills += 1;
                trace!(killer = killer, "kill by unregistered player");
            }
        } else {
            trace!(player = killer, "self kill, counted in the total only");
        }
    }
}

pub struct ScanSession {
    policy: MatchStartPolicy,
    current: Option<OpenGame>,
    completed: Vec<LabeledGame>,
    game_count: u32,
    /// Client id to display name, rebuilt per match. Kill accounting is
    /// by name, never by id; the roster only surfaces renames.
    roster: HashMap<u32, String>,
    stats: ScanStats,
}

impl ScanSession {
    pub fn new(policy: MatchStartPolicy) -> Self {
        Self {
            policy,
            current: None,
            completed: Vec::new(),
            game_count: 0,
            roster: HashMap::new(),
            stats: ScanStats::default(),
        }
    }

    /// Consume one log line. The outer match is the state, the inner match
    /// the event, so every arm is a transition that can actually fire.
    pub fn feed(&mut self, line: &str) {
        self.stats.lines += 1;

        let event = event::classify(line);

        match self.current.as_mut() {
            None => match event {
                LineEvent::InitGame => self.start_game(),
                _ => match self.policy {
                    MatchStartPolicy::Explicit => {
                        trace!("no active match, line ignored");
                    }
                    MatchStartPolicy::Implicit => {
                        // The stray line opens a match and is consumed as
                        // the trigger; its content is not interpreted.
                        self.start_game();
                        self.stats.implicit_starts += 1;
                    }
                },
            },
            Some(open) => match event {
                // An init marker always closes the previous match first, so
                // back-to-back markers still yield one record per match.
                LineEvent::InitGame => {
                    self.finalize_current();
                    self.start_game();
                }
                LineEvent::ClientInfo { client_id, name } => {
                    if let Some(previous) = self.roster.insert(client_id, name.to_string()) {
                        if previous != name {
                            debug!(
                                client_id = client_id,
                                from = %previous,
                                to = name,
                                "client re-announced under a new name"
                            );
                        }
                    }
                    open.register_player(&mut self.stats, name);
                }
                LineEvent::MalformedClientInfo => {
                    self.stats.malformed_client_lines += 1;
                    trace!("identity line defeated the extraction pattern");
                }
                LineEvent::Kill { killer, victim } => {
                    open.record_kill(&mut self.stats, killer, victim);
                }
                LineEvent::MalformedKill => {
                    self.stats.malformed_kill_lines += 1;
                    trace!("kill line defeated the extraction pattern");
                    // An unreadable kill still counts toward the match total.
                    open.game.total_kills += 1;
                }
                LineEvent::ShutdownGame => self.finalize_current(),
                LineEvent::Other => {}
            },
        }
    }

    /// Flush a trailing in-progress match and take the results.
    pub fn finish(mut self) -> ScanReport {
        if self.current.is_some() {
            self.stats.flushed_open_games += 1;
            debug!("stream ended mid-match, flushing open match");
            self.finalize_current();
        }
        ScanReport {
            games: self.completed,
            stats: self.stats,
        }
    }

    fn start_game(&mut self) {
        self.game_count += 1;
        let label = format!("game_{}", self.game_count);
        debug!(label = %label, "match started");
        self.roster.clear();
        self.stats.games_started += 1;
        self.current = Some(OpenGame {
            label,
            game: Game::default(),
        });
    }

    fn finalize_current(&mut self) {
        if let Some(open) = self.current.take() {
            debug!(
                label = %open.label,
                total_kills = open.game.total_kills,
                players = open.game.players.len(),
                "match finalized"
            );
            self.stats.games_completed += 1;
            self.completed.push(LabeledGame {
                label: open.label,
                game: open.game,
            });
        }
    }

}
