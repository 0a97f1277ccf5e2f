//! Event — per-line classification and field extraction.
//!
//! Lines are categorized by cheap substring checks in a fixed priority
//! order, so every line maps to exactly one event. The extraction patterns
//! only run on lines that already passed the substring check; a line that
//! carries a marker but defeats its pattern is reported as malformed
//! rather than silently skipped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker opening a match.
pub(crate) const INIT_GAME: &str = "InitGame:";
/// Marker carrying a client's display name.
pub(crate) const CLIENT_INFO: &str = "ClientUserinfoChanged:";
/// Marker for a kill event.
pub(crate) const KILL: &str = "Kill:";
/// Marker closing a match. Matched without a trailing colon because real
/// logs carry both `ShutdownGame:` and the bare form.
pub(crate) const SHUTDOWN_GAME: &str = "ShutdownGame";

/// Killer name the server uses for environment deaths.
pub(crate) const WORLD: &str = "<world>";

/// Client id and display name out of an identity line. The name runs from
/// `n\` to the next backslash and may contain spaces.
static CLIENT_INFO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ClientUserinfoChanged:\s*(\d+)\s+n\\([^\\]+)").unwrap());

/// Killer and victim names out of a kill line. Both names may contain
/// spaces, so the lazy captures are anchored on ` killed ` and ` by `.
static KILL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Kill:\s*\d+\s+\d+\s+\d+:\s+(.+?) killed (.+?) by").unwrap());

/// One classified log line. Borrowed fields point into the input line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LineEvent<'a> {
    InitGame,
    ClientInfo { client_id: u32, name: &'a str },
    MalformedClientInfo,
    Kill { killer: &'a str, victim: &'a str },
    MalformedKill,
    ShutdownGame,
    Other,
}

pub(crate) fn classify(line: &str) -> LineEvent<'_> {
    if line.contains(INIT_GAME) {
        LineEvent::InitGame
    } else if line.contains(CLIENT_INFO) {
        extract_client_info(line)
    } else if line.contains(KILL) {
        extract_kill(line)
    } else if line.contains(SHUTDOWN_GAME) {
        LineEvent::ShutdownGame
    } else {
        LineEvent::Other
    }
}

fn extract_client_info(line: &str) -> LineEvent<'_> {
    let caps = match CLIENT_INFO_RE.captures(line) {
        Some(caps) => caps,
        None => return LineEvent::MalformedClientInfo,
    };

    let client_id = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
    let name = caps.get(2).map(|m| m.as_str());
    match (client_id, name) {
        (Some(client_id), Some(name)) => LineEvent::ClientInfo { client_id, name },
        _ => LineEvent::MalformedClientInfo,
    }
}

fn extract_kill(line: &str) -> LineEvent<'_> {
    let caps = match KILL_RE.captures(line) {
        Some(caps) => caps,
        None => return LineEvent::MalformedKill,
    };

    match (caps.get(1), caps.get(2)) {
        (Some(killer), Some(victim)) => LineEvent::Kill {
            killer: killer.as_str(),
            victim: victim.as_str(),
        },
        _ => LineEvent::MalformedKill,
    }
}
