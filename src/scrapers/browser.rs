use crate::config::{chrome_candidates, BrowserConfig};
use crate::error::ScoutError;
use crate::scrapers::traits::{BrowserDriver, ContextHandle, ElementHandle, Locator};
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Locate a Chrome binary: explicit path, then known install locations,
/// then whatever headless_chrome detects on its own
pub fn find_chrome(config: &BrowserConfig) -> Result<PathBuf, ScoutError> {
    let mut searched = Vec::new();

    if let Some(path) = &config.chrome_path {
        if path.exists() {
            return Ok(path.clone());
        }
        searched.push(path.clone());
    }

    for path in chrome_candidates() {
        if path.exists() {
            return Ok(path);
        }
        searched.push(path);
    }

    headless_chrome::browser::default_executable()
        .map_err(|_| ScoutError::BrowserNotFound { searched })
}

/// `BrowserDriver` backed by headless Chrome, one tab per context
pub struct ChromeDriver {
    browser: Browser,
    tabs: Vec<(ContextHandle, Arc<Tab>)>,
    current: usize,
    next_id: usize,
}

impl ChromeDriver {
    /// Launch Chrome and open the primary tab
    pub fn launch(config: &BrowserConfig) -> Result<Self, ScoutError> {
        let path = find_chrome(config)?;
        info!("Launching Chrome from {}...", path.display());

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .path(Some(path))
            .idle_browser_timeout(config.idle_timeout)
            .build()
            .map_err(|e| ScoutError::BrowserLaunch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScoutError::BrowserLaunch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScoutError::BrowserLaunch(e.to_string()))?;

        Ok(Self {
            browser,
            tabs: vec![(ContextHandle("ctx-0".to_string()), tab)],
            current: 0,
            next_id: 1,
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>> {
        self.tabs
            .get(self.current)
            .map(|(_, tab)| tab)
            .ok_or_else(|| anyhow!("no current browsing context"))
    }

    /// All elements on the current tab matching the locator
    fn resolve_all(&self, locator: &Locator) -> Result<Vec<Element<'_>>> {
        let tab = self.tab()?;
        let elements = match tab.find_elements(locator.selector()) {
            Ok(elements) => elements,
            // find_elements errors when nothing matches
            Err(_) => return Ok(Vec::new()),
        };

        let Some(wanted) = locator.text() else {
            return Ok(elements);
        };
        Ok(elements
            .into_iter()
            .filter(|el| {
                el.get_inner_text()
                    .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" ") == wanted)
                    .unwrap_or(false)
            })
            .collect())
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<Element<'_>> {
        self.resolve_all(&handle.locator)?
            .into_iter()
            .nth(handle.index)
            .ok_or_else(|| anyhow!("element {:?} no longer present", handle))
    }
}

impl BrowserDriver for ChromeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        let tab = self.tab()?;
        tab.navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        tab.wait_until_navigated()
            .with_context(|| format!("Navigation to {} did not finish", url))?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    fn wait_until_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle> {
        let started = Instant::now();
        loop {
            if !self.resolve_all(locator)?.is_empty() {
                return Ok(ElementHandle {
                    locator: locator.clone(),
                    index: 0,
                });
            }
            if started.elapsed() >= timeout {
                anyhow::bail!("timed out waiting for {:?}", locator);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn click(&mut self, element: &ElementHandle) -> Result<()> {
        // Script click, so overlays covering the element don't swallow it
        self.resolve(element)?
            .call_js_fn("function() { this.click(); }", vec![], false)
            .context("Click failed")?;
        Ok(())
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let count = self.resolve_all(locator)?.len();
        Ok((0..count)
            .map(|index| ElementHandle {
                locator: locator.clone(),
                index,
            })
            .collect())
    }

    fn get_text(&mut self, element: &ElementHandle) -> Result<String> {
        self.resolve(element)?.get_inner_text()
    }

    fn get_attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.resolve(element)?.get_attribute_value(name)
    }

    fn execute_script(&mut self, js: &str) -> Result<serde_json::Value> {
        let result = self.tab()?.evaluate(js, false)?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    fn page_source(&mut self) -> Result<String> {
        let value = self.execute_script("document.documentElement.outerHTML")?;
        match value.as_str() {
            Some(html) => Ok(html.to_string()),
            None => {
                warn!("Could not get HTML from page");
                Ok(String::new())
            }
        }
    }

    fn open_new_context(&mut self) -> Result<ContextHandle> {
        let tab = self.browser.new_tab().context("Failed to open tab")?;
        let handle = ContextHandle(format!("ctx-{}", self.next_id));
        self.next_id += 1;
        self.tabs.push((handle.clone(), tab));
        Ok(handle)
    }

    fn switch_context(&mut self, handle: &ContextHandle) -> Result<()> {
        let index = self
            .tabs
            .iter()
            .position(|(h, _)| h == handle)
            .ok_or_else(|| anyhow!("unknown browsing context {:?}", handle))?;
        self.current = index;
        Ok(())
    }

    fn close_context(&mut self) -> Result<()> {
        if self.tabs.len() <= 1 {
            anyhow::bail!("refusing to close the primary browsing context");
        }
        let (handle, tab) = self.tabs.remove(self.current);
        self.current = 0;
        tab.close(true)
            .with_context(|| format!("Failed to close {:?}", handle))?;
        Ok(())
    }

    fn current_context(&self) -> ContextHandle {
        self.tabs
            .get(self.current)
            .map(|(handle, _)| handle.clone())
            .unwrap_or_else(|| ContextHandle("ctx-0".to_string()))
    }

    fn quit(&mut self) -> Result<()> {
        info!("Closing browser...");
        for (_, tab) in self.tabs.drain(..) {
            if let Err(e) = tab.close(false) {
                debug!("Tab close failed during shutdown: {}", e);
            }
        }
        Ok(())
    }
}
