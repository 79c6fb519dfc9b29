use crate::config::Brand;
use crate::models::{CatalogSnapshot, Gender};
use crate::scrapers::session::ExtractionSession;
use crate::scrapers::traits::BrowserDriver;
use tracing::{info, info_span};

/// Drives one extraction session across every brand and gender.
/// Runs strictly in sequence: the session's navigation state is shared.
pub struct ReviewCollector<D: BrowserDriver> {
    session: ExtractionSession<D>,
}

impl<D: BrowserDriver> ReviewCollector<D> {
    pub fn new(session: ExtractionSession<D>) -> Self {
        Self { session }
    }

    pub fn collect(&mut self, brands: &[Brand], genders: &[Gender]) -> CatalogSnapshot {
        let mut snapshot = CatalogSnapshot::new();
        let total = brands.len() * genders.len();
        let mut done = 0;

        for brand in brands {
            for &gender in genders {
                let span = info_span!("collect", brand = %brand.name, gender = %gender);
                let _guard = span.enter();

                let records = self.session.traverse_listing(brand, gender);
                let records = self.session.apply_filters_and_update_data(records);
                done += 1;
                info!(
                    "Finished {} ({}): {} shoes [{}/{}]",
                    brand.name,
                    gender,
                    records.len(),
                    done,
                    total
                );
                snapshot.insert(&brand.name, gender, records);
            }
        }

        snapshot
    }

    /// End the run, releasing the browser
    pub fn finish(self) -> D {
        self.session.close()
    }
}
