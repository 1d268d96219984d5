//! Track payload parsing
//!
//! The device publishes the current track as free text. Observed shapes:
//!
//! ```text
//! (1/12): Song Title.mp3
//! (3/8): /sd/audiobooks/Chapter 3.ogg
//! /music/folder/Track.flac
//! Some Webradio Station
//! ```
//!
//! Parsing is heuristic and never fails outward: anything that cannot be
//! interpreted becomes a title equal to the raw payload.

use std::num::ParseIntError;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Extensions stripped from the derived title (compared case-insensitively)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// `(N/M): REST` playlist prefix; M is not kept
static PLAYLIST_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(([0-9]+)/([0-9]+)\):\s*(.*)").expect("playlist prefix pattern is valid")
});

/// How a payload was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseOutcome {
    /// Number and/or title were derived from the payload
    Parsed,
    /// Payload was empty or whitespace only
    Empty,
    /// Parsing failed; the raw payload is the title
    Fallback,
}

/// Result of parsing one track payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTrack {
    pub number: Option<u32>,
    pub title: Option<String>,
    pub outcome: ParseOutcome,
}

impl ParsedTrack {
    fn empty() -> Self {
        Self {
            number: None,
            title: None,
            outcome: ParseOutcome::Empty,
        }
    }

    fn fallback(raw: &str) -> Self {
        Self {
            number: None,
            title: Some(raw.to_string()),
            outcome: ParseOutcome::Fallback,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outcome == ParseOutcome::Empty
    }
}

#[derive(Debug, thiserror::Error)]
enum TrackParseError {
    #[error("track number: {0}")]
    TrackNumber(#[from] ParseIntError),
}

/// Parse a raw track payload
pub fn parse_track(payload: &str) -> ParsedTrack {
    if payload.trim().is_empty() {
        return ParsedTrack::empty();
    }

    match try_parse(payload) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!("Error parsing track payload {:?}: {}", payload, err);
            ParsedTrack::fallback(payload)
        }
    }
}

fn try_parse(payload: &str) -> Result<ParsedTrack, TrackParseError> {
    let (number, remaining) = match PLAYLIST_PREFIX.captures(payload) {
        Some(caps) => {
            let number = caps[1].parse::<u32>()?;
            let rest = caps.get(3).map_or("", |m| m.as_str());
            (Some(number), rest)
        }
        None => (None, payload),
    };

    Ok(ParsedTrack {
        number,
        title: derive_title(remaining),
        outcome: ParseOutcome::Parsed,
    })
}

/// File name without directory or known audio extension
///
/// An empty result (e.g. a bare directory path) yields no title.
fn derive_title(remaining: &str) -> Option<String> {
    let name = remaining
        .rsplit_once('/')
        .map_or(remaining, |(_, file)| file);

    let name = match name.rsplit_once('.') {
        Some((stem, ext))
            if AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem
        }
        _ => name,
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
