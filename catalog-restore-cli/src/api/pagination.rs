//! Link header pagination
//!
//! The platform answers the first `GET /products` with a header like
//! `<.../products?page=2>; rel="next", <.../products?page=9>; rel="last"`.
//! Page 1 is fetched on its own, so the range here always starts at the
//! `next` page and runs through `last` inclusive.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RestoreError, Result};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]*)>\s*;\s*rel\s*=\s*"?([A-Za-z]+)"?"#).expect("valid link regex")
});

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*[?&]page=)(\d+)(.*)$").expect("valid page regex")
});

/// URL template plus the inclusive page range it should be expanded over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    prefix: String,
    suffix: String,
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    /// Parse a Link header value.
    ///
    /// Returns `Ok(None)` when there is no `next` link (single-page catalog).
    pub fn parse(descriptor: &str) -> Result<Option<PageRange>> {
        let links: Vec<(&str, String)> = LINK_RE
            .captures_iter(descriptor)
            .filter_map(|caps| {
                let url = caps.get(1)?.as_str();
                let rel = caps.get(2)?.as_str().to_ascii_lowercase();
                Some((url, rel))
            })
            .collect();

        if links.is_empty() {
            return Err(RestoreError::malformed_pagination(
                descriptor,
                "no <url>; rel=... entries found",
            ));
        }

        let Some((next_url, _)) = links.iter().find(|(_, rel)| rel == "next") else {
            return Ok(None);
        };
        let Some((last_url, _)) = links.iter().find(|(_, rel)| rel == "last") else {
            return Err(RestoreError::malformed_pagination(
                descriptor,
                "a next link is present but no last link",
            ));
        };

        let (prefix, first, suffix) = split_page_url(next_url)
            .ok_or_else(|| RestoreError::malformed_pagination(descriptor, "next link has no page number"))?;
        let (_, last, _) = split_page_url(last_url)
            .ok_or_else(|| RestoreError::malformed_pagination(descriptor, "last link has no page number"))?;

        if first > last {
            return Err(RestoreError::malformed_pagination(
                descriptor,
                format!("next page {} is beyond last page {}", first, last),
            ));
        }

        Ok(Some(PageRange {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            first,
            last,
        }))
    }

    /// URL for a single page
    pub fn url_for(&self, page: u32) -> String {
        format!("{}{}{}", self.prefix, page, self.suffix)
    }

    /// Every page URL from `first` to `last`, ascending
    pub fn urls(&self) -> Vec<String> {
        (self.first..=self.last).map(|page| self.url_for(page)).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        (self.last - self.first + 1) as usize
    }
}

/// Expand a Link header into the URLs of every remaining page
pub fn page_urls(descriptor: &str) -> Result<Vec<String>> {
    Ok(PageRange::parse(descriptor)?
        .map(|range| range.urls())
        .unwrap_or_default())
}

/// Page number carried in a URL's `page` query parameter
#[cfg(test)]
pub fn page_number(url: &str) -> Option<u32> {
    split_page_url(url).map(|(_, page, _)| page)
}

fn split_page_url(url: &str) -> Option<(&str, u32, &str)> {
    let caps = PAGE_RE.captures(url.trim())?;
    let prefix = caps.get(1)?.as_str();
    let page = caps.get(2)?.as_str().parse().ok()?;
    let suffix = caps.get(3)?.as_str();
    Some((prefix, page, suffix))
}
