//! In-memory `BrowserDriver` serving canned catalog pages.

use crate::scrapers::traits::{BrowserDriver, ContextHandle, ElementHandle, Locator};
use anyhow::{anyhow, bail, Result};
use scraper::{Html, Selector};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

pub const LISTING: &str = "https://runrepeat.com/catalog/on-running-shoes";
pub const LISTING_WOMEN: &str = "https://runrepeat.com/catalog/on-running-shoes?gender=women";
pub const CONSENT_BUTTON: &str = r#"<button id="onetrust-accept-btn-handler">Accept</button>"#;
const FILTER_LABELS: [&str; 10] = [
    "Road",
    "Trail",
    "Daily running / easy",
    "Tempo / speed",
    "Competition / race",
    "New",
    "2024",
    "2023",
    "2022",
    "2021 or older",
];

/// URL -> HTML. Clicking an element with `data-fake-nav` (or a link)
/// navigates to that URL, which is how toggles are modelled.
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
}

fn item(name: &str, href: Option<&str>, score: &str, adjective: Option<&str>) -> String {
    let link = match href {
        Some(href) => format!(r#"<a href="{}">{}</a>"#, href, name),
        None => format!("<a>{}</a>", name),
    };
    let adjective = adjective
        .map(|a| format!(r#"<div class="corescore-big__text">{}</div>"#, a))
        .unwrap_or_default();
    format!(
        r#"<li class="product_list no_prices">
             <div class="product-name">{}</div>
             <div class="corescore-big__score">{}</div>{}
           </li>"#,
        link, score, adjective
    )
}

pub fn women_toggle() -> String {
    format!(r#"<a class="gender-select-radio__option" href="{}">Women</a>"#, LISTING_WOMEN)
}

fn filter_url(label: &str) -> String {
    format!("{}?filter={}", LISTING, label)
}

fn listing_page(items: &[String], next: Option<&str>, filter_nav: impl Fn(&str) -> String) -> String {
    let filters: String = FILTER_LABELS
        .iter()
        .map(|&label| {
            format!(
                r#"<label><span class="checkbox-label-text" data-fake-nav="{}"> {} </span></label>"#,
                filter_nav(label),
                label
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a class="paginate-buttons next-button" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><body>
             {}
             <div class="gender-select-radio">
               <a class="gender-select-radio__option" href="{}">Men</a>
               {}
             </div>
             <div class="filters">{}</div>
             <ul>{}</ul>{}
           </body></html>"#,
        CONSENT_BUTTON,
        LISTING,
        women_toggle(),
        filters,
        items.concat(),
        next
    )
}

fn detail_page(pros: &[&str], cons: &[&str]) -> String {
    let list = |entries: &[&str]| -> String {
        entries.iter().map(|e| format!("<li>{}</li>", e)).collect()
    };
    format!(
        r#"<html><body><ul id="the_good">{}</ul><ul id="the_bad">{}</ul></body></html>"#,
        list(pros),
        list(cons)
    )
}

impl FakeSite {
    pub fn insert(&mut self, url: &str, html: String) {
        self.pages.insert(url.to_string(), html);
    }

    pub fn remove_page(&mut self, url: &str) {
        self.pages.remove(url);
    }

    /// Drop an HTML fragment from one page
    pub fn strip(&mut self, url: &str, fragment: &str) {
        if let Some(html) = self.pages.get_mut(url) {
            *html = html.replace(fragment, "");
        }
    }

    /// Two-page On listing (men), a one-page women listing, review pages
    /// and filtered result pages
    pub fn on_catalog() -> Self {
        let mut site = FakeSite::default();
        let cloudmonster = item("On Cloudmonster", Some("/on-cloudmonster"), "90", Some("Superb!"));
        let cloud5 = item("On Cloud 5", Some("/on-cloud-5"), "80", Some("Great"));
        let cloudx = item("On Cloud X", None, "75", None);

        site.insert(
            LISTING,
            listing_page(
                &[cloudmonster.clone(), cloud5.clone()],
                Some("/catalog/on-running-shoes?page=2"),
                filter_url,
            ),
        );
        site.insert(
            &format!("{}?page=2", LISTING),
            listing_page(
                &[item("On Cloud 5", Some("/on-cloud-5"), "70", None), cloudx.clone()],
                None,
                filter_url,
            ),
        );
        site.insert(
            LISTING_WOMEN,
            listing_page(
                &[item("On Cloud 5 W", Some("/on-cloud-5-w"), "82", None)],
                None,
                filter_url,
            ),
        );

        site.insert(
            "https://runrepeat.com/on-cloudmonster",
            detail_page(&["Max cushion", "Light-weight feel"], &["Pricey"]),
        );
        site.insert("https://runrepeat.com/on-cloud-5", detail_page(&["Versatile"], &[]));
        site.insert("https://runrepeat.com/on-cloud-5-w", detail_page(&["Snug fit"], &[" "]));

        let filtered: HashMap<&str, Vec<String>> = HashMap::from([
            ("Road", vec![cloudmonster.clone()]),
            ("Trail", vec![cloudmonster.clone()]),
            ("Daily running / easy", vec![cloud5.clone()]),
            ("2023", vec![cloudx, item("Nike Pegasus 40", None, "85", None)]),
        ]);
        for label in FILTER_LABELS {
            let items = filtered.get(label).cloned().unwrap_or_default();
            // Road spills onto a second page
            let next = (label == "Road").then(|| format!("{}&page=2", filter_url(label)));
            let untoggle = |_: &str| LISTING.to_string();
            site.insert(
                &filter_url(label),
                listing_page(&items, next.as_deref(), untoggle),
            );
        }
        site.insert(
            &format!("{}&page=2", filter_url("Road")),
            listing_page(&[cloud5], None, |_| LISTING.to_string()),
        );

        site
    }
}

/// Recording driver over a `FakeSite`
#[derive(Debug)]
pub struct FakeDriver {
    site: FakeSite,
    contexts: Vec<(ContextHandle, Option<String>)>,
    current: usize,
    next_id: usize,
    /// Scrolls since the last navigation; drives the page height
    scrolls: u64,
    scroll_calls: u64,
    endless_page: bool,
    consent_clicked: bool,
    quit_called: bool,
    visits: Vec<String>,
}

impl FakeDriver {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            contexts: vec![(ContextHandle("fake-0".to_string()), None)],
            current: 0,
            next_id: 1,
            scrolls: 0,
            scroll_calls: 0,
            endless_page: false,
            consent_clicked: false,
            quit_called: false,
            visits: Vec::new(),
        }
    }

    /// Pages keep growing on every scroll
    pub fn endless_page(mut self) -> Self {
        self.endless_page = true;
        self
    }

    /// Scroll-to-bottom calls over the driver's lifetime
    pub fn scroll_calls(&self) -> u64 {
        self.scroll_calls
    }

    pub fn consent_clicked(&self) -> bool {
        self.consent_clicked
    }

    pub fn quit_called(&self) -> bool {
        self.quit_called
    }

    pub fn open_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Every URL navigated to, in order
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    fn html(&self) -> Option<&String> {
        let url = self.contexts.get(self.current)?.1.as_ref()?;
        self.site.pages.get(url)
    }

    /// (text, attributes) of each element matching the locator
    fn matches(&self, locator: &Locator) -> Result<Vec<(String, HashMap<String, String>)>> {
        let Some(html) = self.html() else {
            return Ok(Vec::new());
        };
        let selector =
            Selector::parse(locator.selector()).map_err(|e| anyhow!("bad selector: {:?}", e))?;
        let document = Html::parse_document(html);
        Ok(document
            .select(&selector)
            .map(|el| {
                let text = el.text().collect::<Vec<_>>().join(" ");
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                let attrs = el
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (text, attrs)
            })
            .filter(|(text, _)| locator.text().map_or(true, |wanted| text == wanted))
            .collect())
    }

    fn element(&self, handle: &ElementHandle) -> Result<(String, HashMap<String, String>)> {
        self.matches(&handle.locator)?
            .into_iter()
            .nth(handle.index)
            .ok_or_else(|| anyhow!("stale element {:?}", handle))
    }
}

impl BrowserDriver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.visits.push(url.to_string());
        if !self.site.pages.contains_key(url) {
            bail!("404 for {}", url);
        }
        self.scrolls = 0;
        self.contexts[self.current].1 = Some(url.to_string());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        self.contexts[self.current]
            .1
            .clone()
            .ok_or_else(|| anyhow!("blank context"))
    }

    fn wait_until_clickable(&mut self, locator: &Locator, _timeout: Duration) -> Result<ElementHandle> {
        if self.matches(locator)?.is_empty() {
            bail!("timed out waiting for {:?}", locator);
        }
        Ok(ElementHandle {
            locator: locator.clone(),
            index: 0,
        })
    }

    fn click(&mut self, element: &ElementHandle) -> Result<()> {
        let (_, attrs) = self.element(element)?;
        if attrs.get("id").map(String::as_str) == Some("onetrust-accept-btn-handler") {
            self.consent_clicked = true;
            return Ok(());
        }
        match attrs.get("data-fake-nav").or_else(|| attrs.get("href")) {
            Some(target) => {
                let target = target.clone();
                self.navigate(&target)
            }
            None => Ok(()),
        }
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let count = self.matches(locator)?.len();
        Ok((0..count)
            .map(|index| ElementHandle {
                locator: locator.clone(),
                index,
            })
            .collect())
    }

    fn get_text(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(self.element(element)?.0)
    }

    fn get_attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.1.get(name).cloned())
    }

    fn execute_script(&mut self, js: &str) -> Result<serde_json::Value> {
        if js.starts_with("window.scrollTo(0, document.body.scrollHeight") {
            self.scrolls += 1;
            self.scroll_calls += 1;
        } else if js == "document.body.scrollHeight" {
            // grows twice, then stays put unless endless
            let grown = if self.endless_page {
                self.scrolls
            } else {
                self.scrolls.min(2)
            };
            return Ok(json!(1000 + 500 * grown));
        }
        Ok(serde_json::Value::Null)
    }

    fn page_source(&mut self) -> Result<String> {
        self.html()
            .cloned()
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    fn open_new_context(&mut self) -> Result<ContextHandle> {
        let handle = ContextHandle(format!("fake-{}", self.next_id));
        self.next_id += 1;
        self.contexts.push((handle.clone(), None));
        Ok(handle)
    }

    fn switch_context(&mut self, handle: &ContextHandle) -> Result<()> {
        self.current = self
            .contexts
            .iter()
            .position(|(h, _)| h == handle)
            .ok_or_else(|| anyhow!("unknown context {:?}", handle))?;
        Ok(())
    }

    fn close_context(&mut self) -> Result<()> {
        if self.contexts.len() <= 1 {
            bail!("cannot close the last context");
        }
        self.contexts.remove(self.current);
        self.current = 0;
        Ok(())
    }

    fn current_context(&self) -> ContextHandle {
        self.contexts[self.current].0.clone()
    }

    fn quit(&mut self) -> Result<()> {
        self.quit_called = true;
        Ok(())
    }
}
