// Client-side filtering of shared booking offers
use chrono::{DateTime, NaiveDate, TimeZone};

use crate::offer::BookingOffer;

/// Filters applied to the listing. An unset date and an empty area are inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub date: Option<NaiveDate>,
    pub area: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Use the calendar day of a picked timestamp, in its own timezone.
    pub fn with_date_time<Tz: TimeZone>(self, picked: &DateTime<Tz>) -> Self {
        self.with_date(picked.date_naive())
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.date.is_some() || !self.area.is_empty()
    }

    // Conjunction of every active predicate
    pub fn matches(&self, offer: &BookingOffer) -> bool {
        if !self.date.map_or(true, |date| matches_date(offer, date)) {
            return false;
        }

        if !self.area.is_empty() && !matches_area(offer, &self.area) {
            return false;
        }

        true
    }
}

pub fn matches_date(offer: &BookingOffer, date: NaiveDate) -> bool {
    offer.booking_date == date
}

/// Case-insensitive substring match against the vehicle's preferred area or
/// any of the nearby cities.
pub fn matches_area(offer: &BookingOffer, area: &str) -> bool {
    let needle = area.to_lowercase();

    offer.vehicle.preferred_area.to_lowercase().contains(&needle)
        || offer
            .nearby_cities
            .iter()
            .any(|city| city.to_lowercase().contains(&needle))
}

/// Stable filter: keeps the original relative order of the offers that pass.
pub fn filter_offers(offers: &[BookingOffer], state: &FilterState) -> Vec<BookingOffer> {
    if !state.is_active() {
        return offers.to_vec();
    }

    offers
        .iter()
        .filter(|offer| state.matches(offer))
        .cloned()
        .collect()
}
