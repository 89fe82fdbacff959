// Shared booking listing view-model.
// Fetches the offer collection once per activation, filters it on demand and
// gates the booking action; a UI layer renders whatever `display()` returns.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::filter::{filter_offers, FilterState};
use crate::gate::{select_offer, Navigator, OfferRow, Selection};
use crate::lifetime::ViewLifetime;
use crate::offer::BookingOffer;
use crate::source::BookingSource;
use crate::state::StateCell;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed {
        reason: String,
    },
}

/// Transient user-facing message, consumed once by `take_notice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub phase: LoadPhase,
    // Full record set as fetched
    pub offers: Arc<Vec<BookingOffer>>,
    pub filter: FilterState,
    // Filtered subset with derived action state
    pub rows: Vec<OfferRow>,
    pub notice: Option<Notice>,
}

impl ViewState {
    fn refilter(&mut self) {
        self.rows = filter_offers(&self.offers, &self.filter)
            .into_iter()
            .map(OfferRow::from)
            .collect();
    }
}

/// What the listing should render.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    NotLoaded,
    Loading,
    // Loaded, but nothing passes the filters (or nothing was offered)
    Empty,
    Results(Vec<OfferRow>),
    // Fetch failed; no results are listed
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Loaded(usize),
    Failed,
    // Unmounted before the response arrived; response dropped
    Discarded,
    AlreadyMounted,
    Detached,
}

pub struct BookingListView<S, N> {
    source: S,
    navigator: N,
    state: StateCell<ViewState>,
    lifetime: ViewLifetime,
    mounted: AtomicBool,
}

impl<S, N> BookingListView<S, N>
where
    S: BookingSource,
    N: Navigator,
{
    pub fn new(source: S, navigator: N) -> Self {
        Self {
            source,
            navigator,
            state: StateCell::default(),
            lifetime: ViewLifetime::new(),
            mounted: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// Activate the view: fetch the offer collection once.
    pub async fn mount(&self) -> MountOutcome {
        if self.lifetime.is_cancelled() {
            return MountOutcome::Detached;
        }
        if self.mounted.swap(true, Ordering::SeqCst) {
            return MountOutcome::AlreadyMounted;
        }

        self.state.update(|s| s.phase = LoadPhase::Loading);
        tracing::debug!("loading shared booking offers");

        let result = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => None,
            result = self.source.fetch_offers() => Some(result),
        };

        // Torn down while waiting: never write a late response
        let Some(result) = result.filter(|_| !self.lifetime.is_cancelled()) else {
            tracing::debug!("view unmounted during fetch, discarding response");
            return MountOutcome::Discarded;
        };

        match result {
            Ok(offers) => {
                let count = offers.len();
                tracing::info!(count, "shared booking offers loaded");
                self.state.update(|s| {
                    s.offers = Arc::new(offers);
                    s.phase = LoadPhase::Ready;
                    s.refilter();
                });
                MountOutcome::Loaded(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load shared booking offers");
                self.state.update(|s| {
                    s.offers = Arc::new(Vec::new());
                    s.rows.clear();
                    s.phase = LoadPhase::Failed {
                        reason: e.to_string(),
                    };
                    s.notice = Some(Notice {
                        message: format!("Could not load shared bookings: {e}"),
                    });
                });
                MountOutcome::Failed
            }
        }
    }

    /// Tear the view down. Pending fetches are discarded and the record set is released.
    pub fn unmount(&self) {
        if self.lifetime.cancel() {
            self.state.update(|s| {
                s.offers = Arc::new(Vec::new());
                s.rows.clear();
            });
        }
    }

    pub fn set_date_filter(&self, date: Option<NaiveDate>) {
        self.update_filter(|filter| filter.date = date);
    }

    pub fn set_area_filter(&self, area: impl Into<String>) {
        let area = area.into();
        self.update_filter(|filter| filter.area = area);
    }

    pub fn clear_filters(&self) {
        self.update_filter(|filter| *filter = FilterState::default());
    }

    fn update_filter(&self, f: impl FnOnce(&mut FilterState)) {
        if self.lifetime.is_cancelled() {
            tracing::debug!("ignoring filter change on unmounted view");
            return;
        }

        self.state.update(|s| {
            f(&mut s.filter);
            s.refilter();
            tracing::debug!(
                visible = s.rows.len(),
                total = s.offers.len(),
                "filters applied"
            );
        });
    }

    pub fn filter(&self) -> FilterState {
        self.state.with(|s| s.filter.clone())
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.with(|s| s.phase.clone())
    }

    pub fn rows(&self) -> Vec<OfferRow> {
        self.state.with(|s| s.rows.clone())
    }

    pub fn visible_offers(&self) -> Vec<BookingOffer> {
        self.state
            .with(|s| s.rows.iter().map(|row| row.offer.clone()).collect())
    }

    pub fn display(&self) -> DisplayState {
        self.state.with(|s| match &s.phase {
            LoadPhase::Idle => DisplayState::NotLoaded,
            LoadPhase::Loading => DisplayState::Loading,
            LoadPhase::Failed { reason } => DisplayState::Failed {
                reason: reason.clone(),
            },
            LoadPhase::Ready if s.rows.is_empty() => DisplayState::Empty,
            LoadPhase::Ready => DisplayState::Results(s.rows.clone()),
        })
    }

    /// Fire the booking action for a visible offer.
    pub fn select(&self, offer_id: &str) -> Selection {
        let row = self
            .state
            .with(|s| s.rows.iter().find(|row| row.offer.id == offer_id).cloned());

        match row {
            Some(row) => select_offer(&row.offer, &self.navigator),
            None => Selection::NotFound,
        }
    }

    pub fn take_notice(&self) -> Option<Notice> {
        if self.state.with(|s| s.notice.is_none()) {
            return None;
        }
        let mut notice = None;
        self.state.update(|s| notice = s.notice.take());
        notice
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::recording::RecordingNavigator;
    use crate::offer::fixtures::{chicago_and_dallas, offer};
    use crate::source::{SourceError, StaticBookingSource};
    use std::time::Duration;

    fn view_over(
        source: StaticBookingSource,
    ) -> BookingListView<StaticBookingSource, RecordingNavigator> {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        BookingListView::new(source, RecordingNavigator::new())
    }

    #[tokio::test]
    async fn test_mount_loads_and_lists_all_offers() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        assert_eq!(view.display(), DisplayState::NotLoaded);

        assert_eq!(view.mount().await, MountOutcome::Loaded(2));
        assert_eq!(view.phase(), LoadPhase::Ready);
        assert_eq!(view.visible_offers(), chicago_and_dallas());
        assert!(view.take_notice().is_none());

        match view.display() {
            DisplayState::Results(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows[0].can_book);
                assert!(!rows[1].can_book);
            }
            other => panic!("Expected results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_area_filter_and_gated_selection() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        view.mount().await;

        view.set_area_filter("evan");
        let visible: Vec<String> = view.visible_offers().into_iter().map(|o| o.id).collect();
        assert_eq!(visible, vec!["offer-1"]);

        view.clear_filters();
        assert_eq!(view.select("offer-2"), Selection::Disabled);
        assert_eq!(view.select("offer-1"), Selection::Opened);
        assert_eq!(view.select("missing"), Selection::NotFound);
        assert_eq!(view.navigator().opened(), vec!["offer-1"]);
    }

    #[tokio::test]
    async fn test_filtered_out_offer_cannot_be_selected() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        view.mount().await;

        view.set_area_filter("dallas");
        assert_eq!(view.select("offer-1"), Selection::NotFound);
        assert!(view.navigator().opened().is_empty());
    }

    #[tokio::test]
    async fn test_date_and_area_filters_combine() {
        let offers = vec![
            offer("a", (2025, 6, 1), "Chicago", &["Evanston"], 1.0),
            offer("b", (2025, 6, 2), "Chicago", &["Evanston"], 1.0),
            offer("c", (2025, 6, 1), "Austin", &[], 1.0),
        ];
        let view = view_over(StaticBookingSource::new(offers));
        view.mount().await;

        view.set_date_filter(NaiveDate::from_ymd_opt(2025, 6, 1));
        view.set_area_filter("CHICAGO");
        let visible: Vec<String> = view.visible_offers().into_iter().map(|o| o.id).collect();
        assert_eq!(visible, vec!["a"]);

        view.set_date_filter(None);
        let visible: Vec<String> = view.visible_offers().into_iter().map(|o| o.id).collect();
        assert_eq!(visible, vec!["a", "b"]);
        assert_eq!(view.filter(), FilterState::new().with_area("CHICAGO"));
    }

    #[tokio::test]
    async fn test_empty_collection_shows_empty_state() {
        let view = view_over(StaticBookingSource::new(Vec::new()));
        assert_eq!(view.mount().await, MountOutcome::Loaded(0));
        assert_eq!(view.display(), DisplayState::Empty);
        assert!(view.take_notice().is_none());

        view.set_area_filter("anything");
        assert_eq!(view.display(), DisplayState::Empty);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_failed() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        view.mount().await;

        view.set_area_filter("seattle");
        assert_eq!(view.display(), DisplayState::Empty);
        assert_eq!(view.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_fetch_failure_posts_notice_and_degrades_to_empty() {
        let view = view_over(StaticBookingSource::failing(SourceError::Status {
            status_code: 500,
            message: "Internal Server Error".to_string(),
        }));

        assert_eq!(view.mount().await, MountOutcome::Failed);
        assert!(matches!(view.display(), DisplayState::Failed { .. }));
        assert!(view.visible_offers().is_empty());

        let notice = view.take_notice().expect("failure notice");
        assert!(notice.message.contains("500"));
        assert!(view.take_notice().is_none());

        // Filters are no-ops over the empty set
        view.set_area_filter("chicago");
        view.set_date_filter(NaiveDate::from_ymd_opt(2025, 6, 11));
        assert!(view.visible_offers().is_empty());
        assert_eq!(view.select("offer-1"), Selection::NotFound);
    }

    #[tokio::test]
    async fn test_mount_fetches_once() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        assert_eq!(view.mount().await, MountOutcome::Loaded(2));
        assert_eq!(view.mount().await, MountOutcome::AlreadyMounted);
        assert_eq!(view.source().request_count(), 1);
    }

    #[tokio::test]
    async fn test_late_response_after_unmount_is_discarded() {
        let source =
            StaticBookingSource::new(chicago_and_dallas()).with_delay(Duration::from_millis(200));
        let view = Arc::new(view_over(source));

        let mounting = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.mount().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(view.display(), DisplayState::Loading);
        view.unmount();

        assert_eq!(mounting.await.unwrap(), MountOutcome::Discarded);
        assert!(view.visible_offers().is_empty());
        assert_eq!(view.phase(), LoadPhase::Loading);
        assert_eq!(view.mount().await, MountOutcome::Detached);
    }

    #[tokio::test]
    async fn test_unmounted_view_ignores_filter_changes() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        view.mount().await;
        view.unmount();

        let version = view.state.version();
        view.set_area_filter("evan");
        assert_eq!(view.state.version(), version);
        assert_eq!(view.filter(), FilterState::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_load_and_filter_changes() {
        let view = view_over(StaticBookingSource::new(chicago_and_dallas()));
        let mut rx = view.subscribe();

        view.mount().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().rows.len(), 2);

        view.set_area_filter("evan");
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.offers.len(), 2);
        assert_eq!(snapshot.filter.area, "evan");
    }
}
