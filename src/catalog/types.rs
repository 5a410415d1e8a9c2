//! Catalog record types.
//!
//! The raw types mirror the fields consumed from the listing payload; the
//! normalized [`Beatmapset`] carries display-ready data with the ranked
//! instant converted to the fixed local zone.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::datetime::parse_instant;
use crate::{MapwatchError, Result};

/// Base URL for canonical beatmapset pages.
pub const BEATMAPSET_URL_BASE: &str = "https://osu.ppy.sh/beatmapsets/";

/// Root object of the embedded listing payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPayload {
    /// Beatmapsets in listing order.
    pub beatmapsets: Vec<RawBeatmapset>,
}

/// One beatmapset as published by the listing page (consumed fields only).
#[derive(Debug, Clone, Deserialize)]
pub struct RawBeatmapset {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub creator: String,
    pub ranked_date: String,
    pub beatmaps: Vec<RawBeatmap>,
}

/// One difficulty nested in a raw beatmapset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBeatmap {
    pub mode: String,
    pub difficulty_rating: f64,
    pub version: String,
}

/// A normalized beatmapset ready for filtering and display.
///
/// Immutable once constructed from a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Beatmapset {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub creator: String,
    /// Ranked instant in the display timezone.
    pub ranked_at: DateTime<Tz>,
    /// Canonical page URL.
    pub url: String,
    /// Difficulties in listing order.
    pub beatmaps: Vec<Beatmap>,
}

/// A normalized difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    pub mode: String,
    pub version: String,
    pub stars: f64,
}

impl Beatmapset {
    /// Normalize a raw listing entry.
    ///
    /// Fails with a parse error when `ranked_date` is not a valid RFC3339
    /// instant.
    pub fn from_raw(raw: RawBeatmapset) -> Result<Self> {
        let ranked_at = parse_instant(&raw.ranked_date).map_err(|e| {
            MapwatchError::Parse(format!(
                "beatmapset {} has invalid ranked_date `{}`: {e}",
                raw.id, raw.ranked_date
            ))
        })?;

        let beatmaps = raw
            .beatmaps
            .into_iter()
            .map(|bm| Beatmap {
                mode: bm.mode,
                version: bm.version,
                stars: bm.difficulty_rating,
            })
            .collect();

        Ok(Self {
            id: raw.id,
            title: raw.title,
            artist: raw.artist,
            creator: raw.creator,
            ranked_at,
            url: format!("{BEATMAPSET_URL_BASE}{}", raw.id),
            beatmaps,
        })
    }
}
