//! HTML content extraction: drops page chrome and returns readable text.
//!
//! Noise elements (scripts, styles, page header/footer, navigation, side
//! bars, forms and buttons) and comments never contribute text. The main
//! content region is chosen by trying [`ContentRegion`] strategies in
//! priority order, falling back to `<body>`.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SearchError};
use crate::text::clean_text;

/// Elements whose subtrees are treated as non-content.
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "header", "footer", "nav", "aside", "form", "button",
];

/// A strategy for locating the main content region of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRegion {
    /// `<article>`
    Article,
    /// `<main>`
    Main,
    /// `.post-content`
    PostContent,
    /// `.entry-content`
    EntryContent,
    /// `#content`
    ContentId,
    /// `#main`
    MainId,
    /// `.td-post-content`
    TdPostContent,
    /// Whole `<body>`.
    Body,
}

impl ContentRegion {
    /// Strategies in the order they are tried. `Body` is the fallback.
    pub const PRIORITY: [ContentRegion; 8] = [
        Self::Article,
        Self::Main,
        Self::PostContent,
        Self::EntryContent,
        Self::ContentId,
        Self::MainId,
        Self::TdPostContent,
        Self::Body,
    ];

    /// CSS selector for this strategy.
    pub fn css(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Main => "main",
            Self::PostContent => ".post-content",
            Self::EntryContent => ".entry-content",
            Self::ContentId => "#content",
            Self::MainId => "#main",
            Self::TdPostContent => ".td-post-content",
            Self::Body => "body",
        }
    }

    /// First element matching this strategy that is not noise and does not
    /// sit inside noise.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the selector does not compile.
    pub fn locate(self, document: &Html) -> Result<Option<ElementRef<'_>>> {
        let selector = Selector::parse(self.css()).map_err(|e| {
            SearchError::Parse(format!("invalid content selector {}: {e:?}", self.css()))
        })?;
        Ok(document
            .select(&selector)
            .find(|element| !is_noise(element) && !inside_noise(element)))
    }
}

/// Pick the main content region of `document`.
///
/// Returns the winning strategy with its element, or `None` if not even a
/// body is present.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if a strategy selector does not compile.
pub fn locate_content_region(document: &Html) -> Result<Option<(ContentRegion, ElementRef<'_>)>> {
    for region in ContentRegion::PRIORITY {
        if let Some(element) = region.locate(document)? {
            return Ok(Some((region, element)));
        }
    }
    Ok(None)
}

/// Extract the readable text of the page's main content region.
///
/// Visible text fragments are cleaned individually and joined with single
/// spaces. A page whose chosen region holds no text yields an empty string.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if a strategy selector does not compile.
pub fn extract_main_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let Some((region, element)) = locate_content_region(&document)? else {
        return Ok(String::new());
    };
    tracing::trace!(selector = region.css(), "content region selected");
    Ok(visible_text(element))
}

/// Extract the cleaned `<title>` text, if the page has a non-empty one.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))?;
    (!title.is_empty()).then_some(title)
}

/// Cleaned, space-joined text under `region`, skipping noise and comments.
fn visible_text(region: ElementRef<'_>) -> String {
    let mut fragments: Vec<String> = Vec::new();

    let mut stack: Vec<_> = region.children().collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let cleaned = clean_text(text);
                if !cleaned.is_empty() {
                    fragments.push(cleaned);
                }
            }
            Node::Element(element) => {
                if NOISE_TAGS.contains(&element.name()) {
                    continue;
                }
                let start = stack.len();
                stack.extend(node.children());
                stack[start..].reverse();
            }
            _ => {}
        }
    }

    fragments.join(" ")
}

fn is_noise(element: &ElementRef<'_>) -> bool {
    NOISE_TAGS.contains(&element.value().name())
}

fn inside_noise(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_noise(&ancestor))
}
