//! Durable state stores.
//!
//! Two small files under the data directory are the source of truth across
//! restarts: the watermark instant and the subscription set. Both stores
//! self-heal corrupt content by resetting to a default, and overwrite their
//! files atomically via a temp file rename.

pub mod subscriptions;
pub mod watermark;

pub use subscriptions::SubscriptionStore;
pub use watermark::WatermarkStore;
