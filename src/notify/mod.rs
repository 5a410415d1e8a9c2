//! Notification delivery: the poll scheduler and the outbound transport.

pub mod poller;
pub mod sender;

pub use poller::Poller;
pub use sender::{ApiSender, Notifier};
