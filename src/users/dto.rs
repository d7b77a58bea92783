use serde::Deserialize;

use crate::error::ApiError;

pub const QUERY_MIN: usize = 2;
pub const SEARCH_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

impl SearchQuery {
    /// Trimmed search term, at least two characters.
    pub fn term(&self) -> Result<&str, ApiError> {
        let term = self.q.trim();
        if term.chars().count() < QUERY_MIN {
            return Err(ApiError::Validation {
                field: "q",
                message: "search query must be at least 2 characters",
            });
        }
        Ok(term)
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
}

fn default_feed_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_or_blank_query_is_rejected() {
        for q in ["", "a", " a ", "   "] {
            let query = SearchQuery { q: q.into() };
            assert!(query.term().is_err(), "{q:?} should be rejected");
        }
    }

    #[test]
    fn query_is_trimmed_before_the_length_check() {
        let query = SearchQuery { q: "  an  ".into() };
        assert_eq!(query.term().expect("valid"), "an");
    }
}
