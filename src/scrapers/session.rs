use crate::config::{Brand, ScrapeConfig};
use crate::models::{FilterCategory, Gender, ShoeRecord};
use crate::scrapers::listing::{parse_detail_page, parse_item_names, parse_listing_items};
use crate::scrapers::traits::{BrowserDriver, ContextHandle, Locator};
use crate::scrapers::types::DetailReview;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Secondary browsing context for a detail page. Closing it and switching
/// back to the listing context happens on drop, so every open is paired.
struct DetailContext<'a, D: BrowserDriver> {
    driver: &'a mut D,
    primary: ContextHandle,
    secondary: ContextHandle,
}

impl<'a, D: BrowserDriver> DetailContext<'a, D> {
    fn open(driver: &'a mut D) -> Result<Self> {
        let primary = driver.current_context();
        let secondary = driver.open_new_context()?;
        let guard = Self {
            driver,
            primary,
            secondary,
        };
        guard.driver.switch_context(&guard.secondary)?;
        Ok(guard)
    }
}

impl<D: BrowserDriver> Drop for DetailContext<'_, D> {
    fn drop(&mut self) {
        let closed = self
            .driver
            .switch_context(&self.secondary)
            .and_then(|_| self.driver.close_context());
        if let Err(e) = closed {
            warn!("Failed to close detail context: {}", e);
        }
        if let Err(e) = self.driver.switch_context(&self.primary) {
            warn!("Failed to return to listing context: {}", e);
        }
    }
}

/// One browser session walking the catalog. Every DOM interaction is
/// best-effort: failures are logged and the affected field or page skipped.
pub struct ExtractionSession<D: BrowserDriver> {
    driver: D,
    config: ScrapeConfig,
    /// Listing URL (after the gender toggle) of the last traversal
    listing_entry: Option<String>,
}

impl<D: BrowserDriver> ExtractionSession<D> {
    pub fn new(driver: D, config: ScrapeConfig) -> Self {
        Self {
            driver,
            config,
            listing_entry: None,
        }
    }

    /// Release the browser
    pub fn close(mut self) -> D {
        if let Err(e) = self.driver.quit() {
            warn!("Browser did not shut down cleanly: {}", e);
        }
        self.driver
    }

    fn pause(duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    /// Walk every page of a brand's listing, visiting each shoe's review page
    pub fn traverse_listing(&mut self, brand: &Brand, gender: Gender) -> Vec<ShoeRecord> {
        let url = self.config.listing_url(brand);
        info!("Opening {} listing ({}): {}", brand.name, gender, url);

        if let Err(e) = self.driver.navigate(&url) {
            warn!("Could not open listing for {} ({}): {:#}", brand.name, gender, e);
            self.listing_entry = None;
            return Vec::new();
        }

        self.accept_consent();
        if gender == Gender::Female {
            self.select_women();
        } else {
            info!("Gender filter: men (default)");
        }
        self.listing_entry = Some(self.driver.current_url().unwrap_or(url));

        self.scroll_until_stable();
        Self::pause(self.config.pacing.page_settle);

        let mut records: Vec<ShoeRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut page = 1;

        loop {
            Self::pause(self.config.pacing.page_settle);
            if let Ok(current) = self.driver.current_url() {
                visited.insert(current);
            }

            let html = match self.driver.page_source() {
                Ok(html) => html,
                Err(e) => {
                    warn!("Could not read listing page {}: {:#}", page, e);
                    break;
                }
            };

            let items = parse_listing_items(&html, &self.config);
            info!("Page {}: {} listing items", page, items.len());

            for item in items {
                let Ok(name) = item.name else {
                    debug!("Skipping listing item without a name");
                    continue;
                };
                // First seen wins within a brand/gender listing
                if !seen.insert(name.clone()) {
                    debug!("Duplicate listing entry '{}' ignored", name);
                    continue;
                }

                let review = match &item.link {
                    Ok(link) => self.visit_detail(link),
                    Err(_) => DetailReview::default(),
                };

                let mut record = ShoeRecord::new(name);
                record.score = item.score.ok();
                record.adjective = item.adjective.ok();
                record.pros = review.pros;
                record.cons = review.cons;
                records.push(record);
            }

            match self.next_page_url(&visited) {
                Some(next) => {
                    info!("Moving to next page...");
                    if let Err(e) = self.driver.navigate(&next) {
                        warn!("Could not open next page {}: {:#}", next, e);
                        break;
                    }
                    page += 1;
                }
                None => break,
            }
        }

        info!(
            "Collected {} shoes for {} ({}) over {} page(s)",
            records.len(),
            brand.name,
            gender,
            page
        );
        records
    }

    /// Tag records with every filter label under which they are listed
    pub fn apply_filters_and_update_data(&mut self, mut records: Vec<ShoeRecord>) -> Vec<ShoeRecord> {
        if records.is_empty() {
            debug!("No records to enrich, skipping filter passes");
            return records;
        }

        let index: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.name.clone(), i))
            .collect();

        let filters: Vec<(FilterCategory, String)> = self
            .config
            .filters
            .iter()
            .map(|(category, label)| (category, label.to_string()))
            .collect();

        for (category, label) in filters {
            info!("Applying filter {} ({})...", label, category);

            if let Some(entry) = self.listing_entry.clone() {
                if let Err(e) = self.driver.navigate(&entry) {
                    warn!("Could not return to listing before filter {}: {:#}", label, e);
                    continue;
                }
            }

            if let Err(e) = self.toggle_filter(&label) {
                warn!("Could not apply filter {}: {:#}", label, e);
                continue;
            }

            let tagged = self.tag_filtered_pages(&mut records, &index, category, &label);
            info!("Filter {} matched {} shoes", label, tagged);

            if let Err(e) = self.toggle_filter(&label) {
                debug!("Could not clear filter {}: {:#}", label, e);
            }
        }

        records
    }

    fn tag_filtered_pages(
        &mut self,
        records: &mut [ShoeRecord],
        index: &HashMap<String, usize>,
        category: FilterCategory,
        label: &str,
    ) -> usize {
        let mut matched = HashSet::new();
        let mut visited = HashSet::new();

        loop {
            Self::pause(self.config.pacing.page_settle);
            if let Ok(current) = self.driver.current_url() {
                visited.insert(current);
            }

            match self.driver.page_source() {
                Ok(html) => {
                    for name in parse_item_names(&html, &self.config) {
                        if let Some(&i) = index.get(&name) {
                            records[i].tag(category, label);
                            matched.insert(i);
                        }
                    }
                }
                Err(e) => {
                    warn!("Could not read filtered page: {:#}", e);
                    break;
                }
            }

            match self.next_page_url(&visited) {
                Some(next) => {
                    debug!("Moving to next page with filter {} applied...", label);
                    if let Err(e) = self.driver.navigate(&next) {
                        warn!("Could not open next filtered page: {:#}", e);
                        break;
                    }
                }
                None => break,
            }
        }

        matched.len()
    }

    fn toggle_filter(&mut self, label: &str) -> Result<()> {
        let locator = Locator::with_text(&self.config.selectors.filter_label, label);
        let checkbox = self
            .driver
            .wait_until_clickable(&locator, self.config.pacing.filter_timeout)?;
        self.driver.click(&checkbox)?;
        Self::pause(self.config.pacing.toggle_settle);
        Ok(())
    }

    fn accept_consent(&mut self) {
        let locator = Locator::css(&self.config.selectors.consent_button);
        let accepted = self
            .driver
            .wait_until_clickable(&locator, self.config.pacing.consent_timeout)
            .and_then(|button| self.driver.click(&button));
        match accepted {
            Ok(()) => info!("Cookie consent accepted"),
            Err(_) => info!("No cookie consent prompt"),
        }
    }

    fn select_women(&mut self) {
        if let Err(e) = self.driver.scroll_to_top() {
            debug!("Scroll to top failed: {:#}", e);
        }
        Self::pause(self.config.pacing.scroll_pause);

        let locator = Locator::css(&self.config.selectors.gender_toggle);
        let toggles = match self.driver.find_all(&locator) {
            Ok(toggles) => toggles,
            Err(e) => {
                warn!("Could not look up gender toggles: {:#}", e);
                return;
            }
        };

        match toggles.get(1) {
            Some(women) => match self.driver.click(women) {
                Ok(()) => {
                    Self::pause(self.config.pacing.toggle_settle);
                    info!("Gender filter: women applied");
                }
                Err(e) => warn!("Could not apply women filter: {:#}", e),
            },
            None => warn!("Gender toggles not found ({} present)", toggles.len()),
        }
    }

    /// Scroll to the bottom until the document stops growing
    fn scroll_until_stable(&mut self) {
        let Ok(mut last_height) = self.driver.page_height() else {
            return;
        };

        for _ in 0..self.config.pacing.max_scroll_rounds {
            if self.driver.scroll_to_bottom().is_err() {
                return;
            }
            Self::pause(self.config.pacing.scroll_pause);
            let Ok(height) = self.driver.page_height() else {
                return;
            };
            if height == last_height {
                return;
            }
            last_height = height;
        }
        debug!("Page still growing after {} scroll rounds", self.config.pacing.max_scroll_rounds);
    }

    /// href of the next-page control, unless absent or already visited
    fn next_page_url(&mut self, visited: &HashSet<String>) -> Option<String> {
        let locator = Locator::css(&self.config.selectors.next_page);
        let button = match self.driver.find_all(&locator) {
            Ok(buttons) => buttons.into_iter().next(),
            Err(_) => None,
        };
        let Some(button) = button else {
            info!("Next page control not found, pagination exhausted");
            return None;
        };

        match self.driver.get_attribute(&button, "href") {
            Ok(Some(href)) if !href.trim().is_empty() => {
                let next = self.config.absolute_url(href.trim());
                if visited.contains(&next) {
                    info!("Next page {} already visited, stopping", next);
                    None
                } else {
                    Some(next)
                }
            }
            _ => {
                info!("Next page control has no href, pagination exhausted");
                None
            }
        }
    }

    /// Open the review page in a secondary context and read pros/cons
    fn visit_detail(&mut self, url: &str) -> DetailReview {
        let settle = self.config.pacing.detail_settle;
        let selectors = &self.config.selectors;

        let context = match DetailContext::open(&mut self.driver) {
            Ok(context) => context,
            Err(e) => {
                warn!("Could not open detail context for {}: {:#}", url, e);
                return DetailReview::default();
            }
        };

        if let Err(e) = context.driver.navigate(url) {
            warn!("Could not open review page {}: {:#}", url, e);
            return DetailReview::default();
        }
        Self::pause(settle);

        match context.driver.page_source() {
            Ok(html) => parse_detail_page(&html, selectors),
            Err(e) => {
                warn!("Could not read review page {}: {:#}", url, e);
                DetailReview::default()
            }
        }
    }
}
