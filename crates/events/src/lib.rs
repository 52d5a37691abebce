//! Board change notification.
//!
//! - [`ChangeNotifier`] is the in-process publish/subscribe hub for
//!   [`BoardEvent`]s, backed by `tokio::sync::broadcast`.
//! - [`BoardFeed`] is one subscriber's view of it: filtered to a board,
//!   interleaved with keep-alive ticks, and reporting missed events as a
//!   resync signal.
//!
//! Events are wake-up hints. Receivers always re-fetch the board rather
//! than treating a payload as state.

pub mod bus;
pub mod feed;

pub use bus::{BoardEvent, ChangeNotifier, ChangeReason};
pub use feed::{BoardFeed, FeedSignal};
