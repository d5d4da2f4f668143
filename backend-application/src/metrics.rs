use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    searches: AtomicU64,
    search_errors: AtomicU64,
    fetch_batches: AtomicU64,
    listings: AtomicU64,
    validations: AtomicU64,
}

impl Metrics {
    pub fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_error(&self) {
        self.search_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self, batches: usize, listings: usize) {
        self.fetch_batches
            .fetch_add(batches as u64, Ordering::Relaxed);
        self.listings.fetch_add(listings as u64, Ordering::Relaxed);
    }

    pub fn record_validation(&self) {
        self.validations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let searches = self.searches.load(Ordering::Relaxed);
        let errors = self.search_errors.load(Ordering::Relaxed);
        let batches = self.fetch_batches.load(Ordering::Relaxed);
        let listings = self.listings.load(Ordering::Relaxed);
        let validations = self.validations.load(Ordering::Relaxed);

        format!(
            "# TYPE trade_search_searches_total counter\n\
trade_search_searches_total {}\n\
# TYPE trade_search_search_errors_total counter\n\
trade_search_search_errors_total {}\n\
# TYPE trade_search_fetch_batches_total counter\n\
trade_search_fetch_batches_total {}\n\
# TYPE trade_search_listings_total counter\n\
trade_search_listings_total {}\n\
# TYPE trade_search_validations_total counter\n\
trade_search_validations_total {}\n",
            searches, errors, batches, listings, validations
        )
    }
}
