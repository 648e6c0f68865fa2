//! Catalog filter and pagination rules.
//!
//! Both catalog stores evaluate the same [`TitleFilter`]: the in-memory store
//! through [`TitleFilter::matches`], PostgreSQL through the pieces exposed here
//! (`like_pattern`, year bounds, genre set).

use chrono::Datelike;
use serde::Deserialize;
use std::collections::BTreeSet;

use super::Title;
use crate::error::{AppError, AppResult};

/// Raw `/api/titles` query string
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleQueryParams {
    pub page: Option<String>,
    pub query: Option<String>,
    pub min_year: Option<String>,
    pub max_year: Option<String>,
    pub genres: Option<String>,
}

/// Raw `?page=` query string used by the list endpoints
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// Filter over the catalog. All constraints are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name
    pub query: Option<String>,
    /// Inclusive lower release year bound
    pub min_year: i32,
    /// Inclusive upper release year bound
    pub max_year: i32,
    /// Accepted genres; `None` accepts every genre
    pub genres: Option<BTreeSet<String>>,
}

impl TitleFilter {
    /// A filter that accepts every title released up to `current_year`
    pub fn unfiltered(current_year: i32) -> Self {
        Self {
            query: None,
            min_year: 0,
            max_year: current_year,
            genres: None,
        }
    }

    /// Builds the filter from query parameters, defaulting `maxYear` to `current_year`
    pub fn from_params(params: &TitleQueryParams, current_year: i32) -> AppResult<Self> {
        let mut filter = Self::unfiltered(current_year);

        filter.query = non_empty(params.query.as_deref()).map(str::to_string);
        if let Some(raw) = non_empty(params.min_year.as_deref()) {
            filter.min_year = parse_year("minYear", raw)?;
        }
        if let Some(raw) = non_empty(params.max_year.as_deref()) {
            filter.max_year = parse_year("maxYear", raw)?;
        }
        filter.genres = params.genres.as_deref().and_then(parse_genres);

        Ok(filter)
    }

    /// Same as [`TitleFilter::from_params`] with the current UTC year
    pub fn from_params_now(params: &TitleQueryParams) -> AppResult<Self> {
        Self::from_params(params, chrono::Utc::now().year())
    }

    /// Whether the year bounds leave any room at all
    pub fn is_satisfiable(&self) -> bool {
        self.min_year <= self.max_year && self.genres.as_ref().map_or(true, |g| !g.is_empty())
    }

    pub fn matches(&self, title: &Title) -> bool {
        if title.released < self.min_year || title.released > self.max_year {
            return false;
        }
        if let Some(genres) = &self.genres {
            if !genres.contains(&title.genre) {
                return false;
            }
        }
        match &self.query {
            Some(query) => title.title.to_lowercase().contains(&query.to_lowercase()),
            None => true,
        }
    }

    /// `ILIKE` pattern for the text query, with `\` as escape character
    pub fn like_pattern(&self) -> Option<String> {
        self.query.as_ref().map(|query| {
            let mut pattern = String::with_capacity(query.len() + 2);
            pattern.push('%');
            for c in query.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

/// A 1-based page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::InvalidInput(
                "page must be 1 or greater".to_string(),
            ));
        }
        let request = Self { page, size };
        // Reject pages whose offset cannot be represented
        request.checked_offset()?;
        Ok(request)
    }

    /// Parses `?page=`; missing or empty means the first page
    pub fn parse(raw: Option<&str>, size: u32) -> AppResult<Self> {
        match non_empty(raw) {
            None => Self::new(1, size),
            Some(raw) => {
                let page: i64 = raw.parse().map_err(|_| {
                    AppError::InvalidInput(format!("page must be an integer, got '{}'", raw))
                })?;
                let page = u32::try_from(page).map_err(|_| {
                    AppError::InvalidInput("page must be 1 or greater".to_string())
                })?;
                Self::new(page, size)
            }
        }
    }

    fn checked_offset(&self) -> AppResult<i64> {
        i64::from(self.page - 1)
            .checked_mul(i64::from(self.size))
            .ok_or_else(|| AppError::InvalidInput("page is out of range".to_string()))
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Cuts this page out of an already ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .collect()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_year(name: &str, raw: &str) -> AppResult<i32> {
    raw.parse::<i32>().map_err(|_| {
        AppError::InvalidInput(format!("{} must be an integer year, got '{}'", name, raw))
    })
}

fn parse_genres(raw: &str) -> Option<BTreeSet<String>> {
    let genres: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();

    if genres.is_empty() {
        None
    } else {
        Some(genres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> TitleQueryParams {
        let mut params = TitleQueryParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "query" => params.query = value,
                "minYear" => params.min_year = value,
                "maxYear" => params.max_year = value,
                "genres" => params.genres = value,
                other => panic!("unknown param {}", other),
            }
        }
        params
    }

    fn title(name: &str, released: i32, genre: &str) -> Title {
        Title::new(name, released, genre, "")
    }

    #[test]
    fn test_defaults_when_params_absent() {
        let filter = TitleFilter::from_params(&params(&[]), 2026).unwrap();
        assert_eq!(filter, TitleFilter::unfiltered(2026));
    }

    #[test]
    fn test_empty_params_are_ignored() {
        let filter = TitleFilter::from_params(
            &params(&[("query", "  "), ("minYear", ""), ("maxYear", ""), ("genres", ",, ,")]),
            2026,
        )
        .unwrap();
        assert_eq!(filter, TitleFilter::unfiltered(2026));
    }

    #[test]
    fn test_parses_all_fields() {
        let filter = TitleFilter::from_params(
            &params(&[
                ("query", " matrix "),
                ("minYear", "1990"),
                ("maxYear", "2005"),
                ("genres", "Sci-Fi, Action,Sci-Fi"),
            ]),
            2026,
        )
        .unwrap();

        assert_eq!(filter.query.as_deref(), Some("matrix"));
        assert_eq!(filter.min_year, 1990);
        assert_eq!(filter.max_year, 2005);
        let genres: Vec<&str> = filter
            .genres
            .as_ref()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(genres, vec!["Action", "Sci-Fi"]);
    }

    #[test]
    fn test_rejects_non_numeric_year() {
        let err = TitleFilter::from_params(&params(&[("minYear", "nineties")]), 2026).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        let filter = TitleFilter {
            min_year: 1999,
            max_year: 2003,
            ..TitleFilter::unfiltered(2026)
        };
        assert!(filter.matches(&title("The Matrix", 1999, "Sci-Fi")));
        assert!(filter.matches(&title("The Matrix Revolutions", 2003, "Sci-Fi")));
        assert!(!filter.matches(&title("Dark City", 1998, "Sci-Fi")));
        assert!(!filter.matches(&title("Primer", 2004, "Sci-Fi")));
    }

    #[test]
    fn test_inverted_year_range_matches_nothing() {
        let filter = TitleFilter {
            min_year: 2010,
            max_year: 2000,
            ..TitleFilter::unfiltered(2026)
        };
        assert!(!filter.is_satisfiable());
        assert!(!filter.matches(&title("Memento", 2005, "Thriller")));
    }

    #[test]
    fn test_genre_membership() {
        let filter = TitleFilter {
            genres: Some(["Drama".to_string(), "Crime".to_string()].into()),
            ..TitleFilter::unfiltered(2026)
        };
        assert!(filter.matches(&title("Heat", 1995, "Crime")));
        assert!(!filter.matches(&title("Alien", 1979, "Horror")));
        // Genre comparison is exact
        assert!(!filter.matches(&title("Fargo", 1996, "crime")));
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let filter = TitleFilter {
            query: Some("MATRIX".to_string()),
            ..TitleFilter::unfiltered(2026)
        };
        assert!(filter.matches(&title("The Matrix Reloaded", 2003, "Sci-Fi")));
        assert!(!filter.matches(&title("Inception", 2010, "Sci-Fi")));
    }

    #[test]
    fn test_all_constraints_combine() {
        let filter = TitleFilter {
            query: Some("the".to_string()),
            min_year: 1990,
            max_year: 2000,
            genres: Some(["Crime".to_string()].into()),
        };
        assert!(filter.matches(&title("The Usual Suspects", 1995, "Crime")));
        assert!(!filter.matches(&title("The Godfather", 1972, "Crime")));
        assert!(!filter.matches(&title("The Matrix", 1999, "Sci-Fi")));
        assert!(!filter.matches(&title("Heat", 1995, "Crime")));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let filter = TitleFilter {
            query: Some("100%_real\\".to_string()),
            ..TitleFilter::unfiltered(2026)
        };
        assert_eq!(filter.like_pattern().as_deref(), Some("%100\\%\\_real\\\\%"));
        assert_eq!(TitleFilter::unfiltered(2026).like_pattern(), None);
    }

    #[test]
    fn test_page_offsets() {
        let first = PageRequest::parse(None, 6).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 6);

        let third = PageRequest::parse(Some("3"), 6).unwrap();
        assert_eq!(third.offset(), 12);
    }

    #[test]
    fn test_page_rejects_invalid_values() {
        assert!(PageRequest::parse(Some("0"), 6).is_err());
        assert!(PageRequest::parse(Some("-2"), 6).is_err());
        assert!(PageRequest::parse(Some("two"), 6).is_err());
        assert!(PageRequest::parse(Some("99999999999"), 6).is_err());
    }

    #[test]
    fn test_page_slice() {
        let page = PageRequest::new(2, 3).unwrap();
        assert_eq!(page.slice(1..=8), vec![4, 5, 6]);

        let past_end = PageRequest::new(4, 3).unwrap();
        assert!(past_end.slice(1..=8).is_empty());
    }
}
