//! mapwatch - ranked beatmap push notifier
//!
//! Polls the osu! beatmap listing on a fixed interval and pushes newly
//! ranked beatmapsets to subscribed groups through a OneBot-compatible
//! messaging backend. The watermark and subscription set are persisted so
//! no map is announced twice across restarts.

pub mod catalog;
pub mod config;
pub mod datetime;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod notify;
pub mod store;

pub use catalog::{Beatmap, Beatmapset, CatalogFetcher, ListingSource};
pub use config::Config;
pub use error::{MapwatchError, Result};
pub use notify::{ApiSender, Notifier, Poller};
pub use store::{SubscriptionStore, WatermarkStore};
