use std::collections::HashMap;

use url::{form_urlencoded, Url};

const SEARCH_PARAM: &str = "search";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationContext {
    query_params: HashMap<String, String>,
}

impl NavigationContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_query(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('?');
        let mut query_params = HashMap::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            query_params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { query_params }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    pub fn parse(route: &str) -> Self {
        match Url::parse(route) {
            Ok(url) => Self::from_url(&url),
            Err(_) => match route.split_once('?') {
                Some((_, query)) => Self::from_query(query),
                None => Self::from_query(route),
            },
        }
    }

    pub fn with_search(term: impl Into<String>) -> Self {
        let mut query_params = HashMap::new();
        query_params.insert(SEARCH_PARAM.to_string(), term.into());
        Self { query_params }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).map(String::as_str)
    }

    /// Initial search term, absent when the parameter is missing or empty.
    pub fn search_term(&self) -> Option<&str> {
        self.query_param(SEARCH_PARAM).filter(|term| !term.is_empty())
    }
}
