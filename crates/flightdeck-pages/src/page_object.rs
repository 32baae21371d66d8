//! Page Object Model support.
//!
//! Every page in this crate implements [`PageObject`], which names the URL
//! the page lives at and how to tell that it has finished loading.

use crate::result::PageResult;

/// A page (or page-sized region) of the application.
pub trait PageObject {
    /// URL path pattern for this page (e.g. "/search/", "/package/:id/latest/")
    fn url_pattern(&self) -> &str;

    /// Whether the page's anchoring elements are on screen
    fn is_loaded(&self) -> PageResult<bool>;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }

    /// Whether `url` points at this page
    fn matches_url(&self, url: &str) -> bool {
        UrlMatcher::new(self.url_pattern()).matches(url)
    }
}

/// Matches URL paths against a pattern of literal, `*` and `:param`
/// segments. Scheme, host, query string and fragment are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
}

impl UrlMatcher {
    /// Compile a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = path_segments(pattern)
            .map(|s| {
                if s == "*" || s.starts_with(':') {
                    Segment::Any
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// Whether the path of `url` matches
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path: Vec<&str> = path_segments(strip_origin(url)).collect();
        path.len() == self.segments.len()
            && self.segments.iter().zip(path).all(|(seg, part)| match seg {
                Segment::Literal(lit) => lit == part,
                Segment::Any => true,
            })
    }
}

fn strip_origin(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme.find('/').map_or("", |i| &without_scheme[i..])
    } else {
        without_scheme
    };
    path.split(['?', '#']).next().unwrap_or("")
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/search/");
            assert!(matcher.matches("/search/"));
            assert!(matcher.matches("/search"));
            assert!(!matcher.matches("/search/more/"));
            assert!(!matcher.matches("/"));
        }

        #[test]
        fn test_full_url_and_query() {
            let matcher = UrlMatcher::new("/search/");
            assert!(matcher.matches("https://builder.addons.mozilla.org/search/?q=foo&type=a"));
            assert!(matcher.matches("http://localhost:8000/search#results"));
            assert!(!matcher.matches("http://localhost:8000/"));
        }

        #[test]
        fn test_parameter_segments() {
            let matcher = UrlMatcher::new("/package/:id/latest/");
            assert!(matcher.matches("/package/1234/latest/"));
            assert!(!matcher.matches("/package/1234/"));
        }

        #[test]
        fn test_wildcard_segment() {
            let matcher = UrlMatcher::new("/user/*/");
            assert!(matcher.matches("http://localhost/user/someone/"));
        }
    }

    mod page_object_trait_tests {
        use super::*;

        struct Dashboard;

        impl PageObject for Dashboard {
            fn url_pattern(&self) -> &str {
                "/user/dashboard/"
            }

            fn is_loaded(&self) -> PageResult<bool> {
                Ok(true)
            }
        }

        #[test]
        fn test_page_name_is_short_type_name() {
            assert_eq!(Dashboard.page_name(), "Dashboard");
        }

        #[test]
        fn test_matches_url() {
            assert!(Dashboard.matches_url("http://localhost:8000/user/dashboard/"));
            assert!(!Dashboard.matches_url("http://localhost:8000/search/"));
        }
    }
}
