//! Catalog client: fetching the beatmap listing and normalizing records.

pub mod fetcher;
pub mod format;
pub mod types;

pub use fetcher::{CatalogFetcher, ListingSource};
pub use format::{render_digest, render_set, DIGEST_HEADER};
pub use types::{Beatmap, Beatmapset, RawBeatmap, RawBeatmapset};
