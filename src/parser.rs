//! Playlist file import.
//!
//! Turns the text of an exported playlist into `(name, artist)` pairs. The
//! input format is chosen once per file from its suffix (and, for JSON, the
//! document's top-level shape); rows that cannot be read are dropped.

use serde_json::Value;

use crate::models::RawTrackRef;

const ARTIST_TITLE_DELIMITER: &str = " - ";
const EXTINF_PREFIX: &str = "#EXTINF:";

/// Parser selected for one input.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistFormat {
    /// `{"tracks": [{"track": {"name", "artists": [{"name"}]}}]}`
    JsonWrapped(Vec<Value>),
    /// `[{"name", "artist"}]`
    JsonBare(Vec<Value>),
    /// A `.json` file that is not valid JSON or has neither shape.
    JsonUnreadable,
    Csv,
    M3u,
    Text,
}

impl PlaylistFormat {
    pub fn detect(content: &str, filename: &str) -> Self {
        if filename.ends_with(".json") {
            Self::detect_json(content)
        } else if filename.ends_with(".csv") {
            PlaylistFormat::Csv
        } else if filename.ends_with(".m3u") {
            PlaylistFormat::M3u
        } else {
            PlaylistFormat::Text
        }
    }

    fn detect_json(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(mut obj)) => match obj.remove("tracks") {
                Some(Value::Array(items)) => PlaylistFormat::JsonWrapped(items),
                _ => PlaylistFormat::JsonUnreadable,
            },
            Ok(Value::Array(items)) => PlaylistFormat::JsonBare(items),
            Ok(_) => PlaylistFormat::JsonUnreadable,
            Err(e) => {
                log::warn!("Could not parse JSON playlist: {}", e);
                PlaylistFormat::JsonUnreadable
            }
        }
    }
}

/// Parses `content`, dispatching on `filename`. Never fails; unreadable input
/// yields an empty list.
pub fn parse(content: &str, filename: &str) -> Vec<RawTrackRef> {
    let format = PlaylistFormat::detect(content, filename);
    let tracks = match format {
        PlaylistFormat::JsonWrapped(items) => parse_json_wrapped(&items),
        PlaylistFormat::JsonBare(items) => parse_json_bare(&items),
        PlaylistFormat::JsonUnreadable => Vec::new(),
        PlaylistFormat::Csv => parse_csv(content),
        PlaylistFormat::M3u => parse_m3u(content),
        PlaylistFormat::Text => parse_text(content),
    };

    log::debug!("Parsed {} tracks from {}", tracks.len(), filename);
    tracks
}

fn parse_json_wrapped(items: &[Value]) -> Vec<RawTrackRef> {
    items
        .iter()
        .filter_map(|item| {
            let track = item.get("track")?;
            let name = track.get("name")?.as_str()?;
            let artist = track
                .get("artists")?
                .as_array()?
                .first()?
                .get("name")?
                .as_str()?;
            RawTrackRef::new(name, artist)
        })
        .collect()
}

fn parse_json_bare(items: &[Value]) -> Vec<RawTrackRef> {
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let artist = item.get("artist")?.as_str()?;
            RawTrackRef::new(name, artist)
        })
        .collect()
}

fn non_blank_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').filter(|line| !line.trim().is_empty())
}

fn strip_quotes(field: &str) -> &str {
    let field = field.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

fn parse_csv(content: &str) -> Vec<RawTrackRef> {
    let mut lines = non_blank_lines(content).peekable();

    if lines
        .peek()
        .is_some_and(|first| first.to_lowercase().contains("name"))
    {
        lines.next();
    }

    lines
        .filter_map(|line| {
            let mut fields = line.split(',').map(strip_quotes);
            let name = fields.next()?;
            let artist = fields.next()?;
            RawTrackRef::new(name, artist)
        })
        .collect()
}

/// `"Artist - Title"` split once; the title keeps any further delimiters.
fn split_artist_title(text: &str) -> Option<RawTrackRef> {
    let (artist, name) = text.split_once(ARTIST_TITLE_DELIMITER)?;
    RawTrackRef::new(name, artist)
}

fn parse_m3u(content: &str) -> Vec<RawTrackRef> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with(EXTINF_PREFIX))
        .filter_map(|line| {
            let (_, info) = line.split_once(',')?;
            split_artist_title(info)
        })
        .collect()
}

fn parse_text(content: &str) -> Vec<RawTrackRef> {
    non_blank_lines(content)
        .filter_map(split_artist_title)
        .collect()
}
