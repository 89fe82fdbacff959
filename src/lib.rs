// Shared booking listing: fetch, filter and gate shared-capacity transport offers

pub mod config;
pub mod filter;
pub mod gate;
pub mod lifetime;
pub mod offer;
pub mod source;
pub mod state;
pub mod view;

// Re-export key types for convenience
pub use config::{ConfigError, SourceConfig};
pub use filter::{filter_offers, matches_area, matches_date, FilterState};
pub use gate::{can_book, select_offer, Navigator, OfferRow, Selection};
pub use lifetime::ViewLifetime;
pub use offer::{BookingOffer, Vehicle};
pub use source::{BookingSource, HttpBookingSource, SourceError, StaticBookingSource};
pub use state::StateCell;
pub use view::{BookingListView, DisplayState, LoadPhase, MountOutcome, Notice, ViewState};
