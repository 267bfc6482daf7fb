//! Filter criteria: resource-type categories plus a free-text query

use crate::entry::{Entry, ResourceType};
use std::fmt;
use std::str::FromStr;

/// Category chips offered by the filter bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    All,
    Xhr,
    Js,
    Css,
    Img,
    Media,
    Font,
    Doc,
    Ws,
    Wasm,
    Manifest,
    Other,
}

impl FilterType {
    /// Every category, in filter bar order
    pub const ALL: [FilterType; 12] = [
        FilterType::All,
        FilterType::Xhr,
        FilterType::Js,
        FilterType::Css,
        FilterType::Img,
        FilterType::Media,
        FilterType::Font,
        FilterType::Doc,
        FilterType::Ws,
        FilterType::Wasm,
        FilterType::Manifest,
        FilterType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterType::All => "All",
            FilterType::Xhr => "Fetch/XHR",
            FilterType::Js => "JS",
            FilterType::Css => "CSS",
            FilterType::Img => "Img",
            FilterType::Media => "Media",
            FilterType::Font => "Font",
            FilterType::Doc => "Doc",
            FilterType::Ws => "WS",
            FilterType::Wasm => "Wasm",
            FilterType::Manifest => "Manifest",
            FilterType::Other => "Other",
        }
    }

    /// Whether an entry of `resource_type` belongs to this category
    pub fn accepts(&self, resource_type: ResourceType) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Xhr => resource_type == ResourceType::Xhr,
            FilterType::Js => resource_type == ResourceType::Script,
            FilterType::Css => resource_type == ResourceType::Stylesheet,
            FilterType::Img => resource_type == ResourceType::Image,
            FilterType::Media => resource_type == ResourceType::Media,
            FilterType::Font => resource_type == ResourceType::Font,
            FilterType::Doc => resource_type == ResourceType::Document,
            FilterType::Ws => resource_type == ResourceType::WebSocket,
            FilterType::Wasm => resource_type == ResourceType::Wasm,
            FilterType::Manifest => resource_type == ResourceType::Manifest,
            FilterType::Other => resource_type == ResourceType::Other,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FilterType::All),
            "xhr" | "fetch" => Ok(FilterType::Xhr),
            "js" | "script" => Ok(FilterType::Js),
            "css" | "stylesheet" => Ok(FilterType::Css),
            "img" | "image" => Ok(FilterType::Img),
            "media" => Ok(FilterType::Media),
            "font" => Ok(FilterType::Font),
            "doc" | "document" => Ok(FilterType::Doc),
            "ws" | "websocket" => Ok(FilterType::Ws),
            "wasm" => Ok(FilterType::Wasm),
            "manifest" => Ok(FilterType::Manifest),
            "other" => Ok(FilterType::Other),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// Selected categories. Never empty: either exactly `All`, or one or more
/// concrete categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter {
    types: Vec<FilterType>,
}

impl Default for TypeFilter {
    fn default() -> Self {
        Self {
            types: vec![FilterType::All],
        }
    }
}

impl TypeFilter {
    /// Toggle one category chip.
    ///
    /// `All` resets to `[All]`; a concrete category replaces `All`; removing
    /// the last concrete category falls back to `[All]`.
    pub fn toggle(&mut self, filter_type: FilterType) {
        if filter_type == FilterType::All {
            self.types = vec![FilterType::All];
            return;
        }

        self.types.retain(|t| *t != FilterType::All);
        if let Some(pos) = self.types.iter().position(|t| *t == filter_type) {
            self.types.remove(pos);
            if self.types.is_empty() {
                self.types.push(FilterType::All);
            }
        } else {
            self.types.push(filter_type);
        }
    }

    pub fn contains(&self, filter_type: FilterType) -> bool {
        self.types.contains(&filter_type)
    }

    pub fn is_all(&self) -> bool {
        self.contains(FilterType::All)
    }

    pub fn types(&self) -> &[FilterType] {
        &self.types
    }

    pub fn accepts(&self, resource_type: ResourceType) -> bool {
        self.types.iter().any(|t| t.accepts(resource_type))
    }
}

/// Everything that decides whether an entry is in the view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub text: String,
    pub types: TypeFilter,
    /// Negates the text match only; categories are never inverted
    pub invert: bool,
}

impl FilterCriteria {
    /// Prepare the criteria for matching many entries
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            criteria: self,
            query: (!self.text.is_empty()).then(|| self.text.to_lowercase()),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.matcher().matches(entry)
    }
}

/// Filter criteria with the query lowercased once
pub struct Matcher<'a> {
    criteria: &'a FilterCriteria,
    query: Option<String>,
}

impl Matcher<'_> {
    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.criteria.types.accepts(entry.resource_type()) {
            return false;
        }
        match &self.query {
            None => true,
            Some(query) => text_matches(entry, query) != self.criteria.invert,
        }
    }
}

/// Case-insensitive substring match against URL, method, status and MIME type
pub fn text_matches(entry: &Entry, query: &str) -> bool {
    entry.url().to_lowercase().contains(query)
        || entry.method().to_lowercase().contains(query)
        || entry.status().to_string().contains(query)
        || entry.mime_type().to_lowercase().contains(query)
}
