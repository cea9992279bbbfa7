//! Deterministic object-key derivation.
//!
//! Every captured image is stored under `{url-slug}/{device}/{run-stamp}.jpg`.
//! The format is a wire contract: downstream consumers group and compare
//! images by parsing these keys, so it must stay bit-stable across releases.

use chrono::{DateTime, SecondsFormat, Utc};

/// Derive the storage slug for a target URL.
///
/// The scheme is dropped; host, path, and query are kept; every run of
/// non-alphanumeric characters collapses into a single `-`. The result is a
/// single lowercase path segment.
pub fn url_slug(raw: &str) -> String {
    let material = match url::Url::parse(raw) {
        Ok(u) => {
            let mut m = u.host_str().unwrap_or_default().to_string();
            let path = u.path().trim_matches('/');
            if !path.is_empty() {
                m.push('-');
                m.push_str(path);
            }
            if let Some(query) = u.query() {
                m.push('-');
                m.push_str(query);
            }
            m
        }
        Err(_) => raw.trim().to_string(),
    };

    let mut slug = String::with_capacity(material.len());
    let mut pending_dash = false;
    for c in material.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Timestamp component shared by every object key of one run: the run start
/// instant in RFC 3339 with millisecond precision and a `Z` suffix.
pub fn run_stamp(started_at: DateTime<Utc>) -> String {
    started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Full object key for one captured image.
pub fn object_key(slug: &str, device: &str, stamp: &str) -> String {
    format!("{slug}/{device}/{stamp}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slug_drops_scheme_and_folds_punctuation() {
        assert_eq!(url_slug("https://a.test"), "a-test");
        assert_eq!(url_slug("https://www.example.com/news/today"), "www-example-com-news-today");
        assert_eq!(url_slug("http://EXAMPLE.com/Path_With/Case"), "example-com-path-with-case");
    }

    #[test]
    fn slug_keeps_query_material() {
        assert_eq!(
            url_slug("https://a.test/section?edition=us"),
            "a-test-section-edition-us"
        );
    }

    #[test]
    fn slug_never_starts_or_ends_with_dash() {
        assert_eq!(url_slug("https://a.test/news/"), "a-test-news");
        assert_eq!(url_slug("  odd input!!"), "odd-input");
    }

    #[test]
    fn slug_is_deterministic() {
        let a = url_slug("https://www.a.test/front");
        let b = url_slug("https://www.a.test/front");
        assert_eq!(a, b);
    }

    #[test]
    fn run_stamp_has_millisecond_utc_format() {
        let at = Utc.with_ymd_and_hms(2026, 8, 23, 6, 0, 0).unwrap();
        assert_eq!(run_stamp(at), "2026-08-23T06:00:00.000Z");
    }

    #[test]
    fn distinct_runs_produce_disjoint_keys() {
        let first = Utc.with_ymd_and_hms(2026, 8, 23, 6, 0, 0).unwrap();
        let second = first + chrono::Duration::milliseconds(1);
        let a = object_key("a-test", "desktop", &run_stamp(first));
        let b = object_key("a-test", "desktop", &run_stamp(second));
        assert_ne!(a, b);
    }

    #[test]
    fn object_key_layout_is_exact() {
        let key = object_key("a-test", "mobile", "2026-08-23T06:00:00.000Z");
        assert_eq!(key, "a-test/mobile/2026-08-23T06:00:00.000Z.jpg");
    }
}
