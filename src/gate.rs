// "Make booking" action gate and the navigation hand-off
use crate::offer::BookingOffer;

/// Receives the selected offer when a booking action fires.
pub trait Navigator: Send + Sync {
    fn open_booking(&self, offer: &BookingOffer);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Opened,
    // Action disabled, nothing happened
    Disabled,
    NotFound,
}

/// An offer with its derived action state, as shown in the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferRow {
    pub offer: BookingOffer,
    pub can_book: bool,
}

impl From<BookingOffer> for OfferRow {
    fn from(offer: BookingOffer) -> Self {
        let can_book = can_book(&offer);
        Self { offer, can_book }
    }
}

pub fn can_book(offer: &BookingOffer) -> bool {
    offer.free_capacity > 0.0
}

pub fn select_offer(offer: &BookingOffer, navigator: &dyn Navigator) -> Selection {
    if !can_book(offer) {
        tracing::debug!(offer_id = %offer.id, "booking action disabled, no free capacity");
        return Selection::Disabled;
    }

    navigator.open_booking(offer);
    Selection::Opened
}
