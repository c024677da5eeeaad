//! User-configured link exclusion.

use regex::Regex;
use tracing::debug;

use crate::application::dto::ConversionFilters;
use crate::domain::entities::{LinkKind, LinkMatch};

enum CustomFilter {
    /// Substring of the matched link text.
    Literal(String),
    /// `*` wildcard pattern tested against the reference.
    Wildcard(Regex),
}

impl CustomFilter {
    fn parse(filter: &str) -> Option<Self> {
        if filter.is_empty() {
            return None;
        }

        if !filter.contains('*') {
            return Some(Self::Literal(filter.to_string()));
        }

        let pattern = filter
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Regex::new(&pattern).ok().map(Self::Wildcard)
    }

    fn matches(&self, link: &LinkMatch) -> bool {
        match self {
            Self::Literal(text) => link.raw.contains(text.as_str()),
            Self::Wildcard(re) => re.is_match(&link.reference),
        }
    }
}

/// Compiled form of [`ConversionFilters`], built once per run.
pub struct LinkFilter {
    skip_internal: bool,
    skip_remote: bool,
    custom: Vec<CustomFilter>,
}

impl LinkFilter {
    /// Compiles `filters`. Empty custom filters are ignored.
    #[must_use]
    pub fn new(filters: &ConversionFilters) -> Self {
        Self {
            skip_internal: filters.skip_internal_links,
            skip_remote: filters.skip_remote_links,
            custom: filters
                .custom_filters
                .iter()
                .filter_map(|f| CustomFilter::parse(f))
                .collect(),
        }
    }

    /// Returns true if `link` must be left untouched.
    #[must_use]
    pub fn should_skip(&self, link: &LinkMatch) -> bool {
        if self.skip_internal && link.kind == LinkKind::Embed {
            debug!(link = %link.reference, "Skipping internal link");
            return true;
        }

        if self.skip_remote && link.is_remote_reference() {
            debug!(link = %link.reference, "Skipping remote link");
            return true;
        }

        let filtered = self.custom.iter().any(|f| f.matches(link));
        if filtered {
            debug!(link = %link.reference, "Link matched a custom filter");
        }
        filtered
    }
}

/// One-off form of [`LinkFilter::should_skip`].
#[must_use]
pub fn should_skip(link: &LinkMatch, filters: &ConversionFilters) -> bool {
    LinkFilter::new(filters).should_skip(link)
}
