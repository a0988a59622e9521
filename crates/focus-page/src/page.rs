//! What the relay can read from the page it runs in.

use parking_lot::RwLock;

/// Read access to the current document.
pub trait PageSource: Send + Sync {
    fn url(&self) -> String;

    /// Visible text of the page, `None` when extraction failed.
    fn text(&self) -> Option<String>;

    /// Text to judge relevance on: the extracted text, or the URL when the
    /// page has none.
    fn content(&self) -> String {
        match self.text() {
            Some(text) if !text.trim().is_empty() => text,
            _ => format!("URL: {}", self.url()),
        }
    }
}

/// A page held in memory, navigable by the caller.
pub struct StaticPage {
    state: RwLock<(String, Option<String>)>,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, text: Option<String>) -> Self {
        Self {
            state: RwLock::new((url.into(), text)),
        }
    }

    /// Replace the document, as a same-tab navigation does.
    pub fn navigate(&self, url: impl Into<String>, text: Option<String>) {
        *self.state.write() = (url.into(), text);
    }
}

impl PageSource for StaticPage {
    fn url(&self) -> String {
        self.state.read().0.clone()
    }

    fn text(&self) -> Option<String> {
        self.state.read().1.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_prefers_text() {
        let page = StaticPage::new("https://example.com", Some("Verb tables".to_string()));
        assert_eq!(page.content(), "Verb tables");
    }

    #[test]
    fn test_blank_text_falls_back_to_url() {
        let page = StaticPage::new("https://example.com/a", Some("  \n".to_string()));
        assert_eq!(page.content(), "URL: https://example.com/a");
        page.navigate("https://example.com/b", None);
        assert_eq!(page.content(), "URL: https://example.com/b");
    }
}
