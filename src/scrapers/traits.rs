use anyhow::Result;
use std::time::Duration;

/// How to find elements on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Plain CSS selector
    Css(String),
    /// CSS selector narrowed to elements whose trimmed text equals `text`
    CssWithText { css: String, text: String },
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    pub fn with_text(selector: &str, text: &str) -> Self {
        Locator::CssWithText {
            css: selector.to_string(),
            text: text.to_string(),
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Locator::Css(css) | Locator::CssWithText { css, .. } => css,
        }
    }

    /// Text filter, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Locator::Css(_) => None,
            Locator::CssWithText { text, .. } => Some(text),
        }
    }
}

/// Reference to the `index`-th match of a locator on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub locator: Locator,
    pub index: usize,
}

/// Identifies one browsing context (tab)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub String);

/// Browser automation primitives the extraction session is written against.
/// One driver is one browser session and must not be shared between
/// concurrent navigations.
pub trait BrowserDriver {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&mut self) -> Result<String>;

    /// Poll until the locator matches, failing once `timeout` has elapsed
    fn wait_until_clickable(&mut self, locator: &Locator, timeout: Duration)
        -> Result<ElementHandle>;

    fn click(&mut self, element: &ElementHandle) -> Result<()>;

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>>;

    fn get_text(&mut self, element: &ElementHandle) -> Result<String>;

    fn get_attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    fn execute_script(&mut self, js: &str) -> Result<serde_json::Value>;

    /// Serialized DOM of the current page
    fn page_source(&mut self) -> Result<String>;

    /// Open a new context without switching to it
    fn open_new_context(&mut self) -> Result<ContextHandle>;

    fn switch_context(&mut self, handle: &ContextHandle) -> Result<()>;

    /// Close the current context; the caller switches back explicitly
    fn close_context(&mut self) -> Result<()>;

    fn current_context(&self) -> ContextHandle;

    fn scroll_to_bottom(&mut self) -> Result<()> {
        self.execute_script("window.scrollTo(0, document.body.scrollHeight);")
            .map(|_| ())
    }

    fn scroll_to_top(&mut self) -> Result<()> {
        self.execute_script("window.scrollTo(0, 0);").map(|_| ())
    }

    fn page_height(&mut self) -> Result<u64> {
        let value = self.execute_script("document.body.scrollHeight")?;
        value
            .as_f64()
            .map(|h| h as u64)
            .ok_or_else(|| anyhow::anyhow!("page height is not a number: {}", value))
    }

    /// Release the browser; the default does nothing
    fn quit(&mut self) -> Result<()> {
        Ok(())
    }
}
