// src/search/query.rs
//! Provider query syntax for the two search call sites.

use chrono::{Duration, NaiveDate, Utc};
use url::form_urlencoded;

const NEWS_SEARCH_BASE: &str = "https://news.google.com/search";

/// Google News search URL for a topic, sorted by date.
pub fn news_listing_url(topic: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", topic)
        .append_pair("tbs", "sbd:1")
        .finish();
    format!("{NEWS_SEARCH_BASE}?{query}")
}

/// Site-restricted query with a provider-side recency filter.
/// The provider filters by date; results are not re-checked here.
pub fn discussion_query(topic: &str, site: &str, since: NaiveDate) -> String {
    format!("{topic} site:{site} after:{}", since.format("%Y-%m-%d"))
}

/// First day of the trailing recency window, counted from today (UTC).
pub fn recency_cutoff(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_url_form_encodes_topic() {
        assert_eq!(
            news_listing_url("AI chips & export"),
            "https://news.google.com/search?q=AI+chips+%26+export&tbs=sbd%3A1"
        );
    }

    #[test]
    fn news_url_encodes_reserved_characters() {
        let url = news_listing_url("C++ #1 / a=b?");
        assert_eq!(
            url,
            "https://news.google.com/search?q=C%2B%2B+%231+%2F+a%3Db%3F&tbs=sbd%3A1"
        );
        assert!(url::Url::parse(&url).is_ok());
    }

    #[test]
    fn discussion_query_carries_site_and_date() {
        let since = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        assert_eq!(
            discussion_query("Bitcoin", "reddit.com", since),
            "Bitcoin site:reddit.com after:2026-10-05"
        );
    }

    #[test]
    fn cutoff_is_in_the_past() {
        let today = Utc::now().date_naive();
        assert_eq!((today - recency_cutoff(14)).num_days(), 14);
    }
}
