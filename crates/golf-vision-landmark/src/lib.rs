//! Fiducial landmark search and localisation.
//!
//! Two entry points share the marker-feed parsing:
//! - [`LandmarkSearch`] sweeps the head yaw until the feed reports a marker,
//! - [`LandmarkLocator`] polls the feed once and places the marker in the
//!   robot frame.

pub mod feed;
mod locate;
mod search;

pub use feed::{parse_payload, FeedError, MarkerAngles};
pub use locate::{LandmarkLocator, LandmarkLocatorParams, LandmarkSighting, LocateError};
pub use search::{LandmarkSearch, LandmarkSearchParams, SearchError, SearchOutcome, SearchState};
