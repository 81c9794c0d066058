//! Client-side views over fetched data: the attendee dashboard split, QR
//! ticket links and event filtering.
//!
//! Nothing here talks to the network; callers pass in what the endpoint
//! groups returned.

use std::cmp::Ordering;

use chrono::NaiveDate;
use eventra_protocol::{Event, EventFilters, Registration};

/// An attendee's registrations, split around today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    /// Events dated today or later, soonest first.
    pub upcoming: Vec<Registration>,
    /// Events dated before today, most recent first. Registrations whose
    /// event has no date come last.
    pub past: Vec<Registration>,
}

impl Dashboard {
    /// Registrations that carry a QR ticket, upcoming ones first.
    pub fn with_qr_codes(&self) -> Vec<&Registration> {
        self.upcoming
            .iter()
            .chain(&self.past)
            .filter(|r| has_qr_code(r))
            .collect()
    }
}

/// Splits `registrations` into upcoming and past relative to `today`.
///
/// An event happening today counts as upcoming.
pub fn partition_registrations(registrations: Vec<Registration>, today: NaiveDate) -> Dashboard {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) = registrations
        .into_iter()
        .partition(|r| r.event.date.is_some_and(|date| date >= today));

    upcoming.sort_by_key(|r| r.event.date);
    past.sort_by(|a, b| match (a.event.date, b.event.date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Dashboard { upcoming, past }
}

fn has_qr_code(registration: &Registration) -> bool {
    registration
        .qr_code
        .as_deref()
        .is_some_and(|qr| !qr.is_empty())
}

/// Absolute URL of a registration's QR image.
///
/// The backend returns either a full URL or a media path relative to
/// `media_origin` (see [`ClientConfig::media_origin`](crate::ClientConfig::media_origin)).
pub fn qr_code_url(registration: &Registration, media_origin: &str) -> Option<String> {
    let qr = registration.qr_code.as_deref().filter(|qr| !qr.is_empty())?;
    if qr.starts_with("http") {
        return Some(qr.to_string());
    }
    Some(format!("{}{qr}", media_origin.trim_end_matches('/')))
}

/// Applies `filters` to already-fetched events.
///
/// `search` matches title, description, venue, location and tags,
/// case-insensitively. `category` and `city` must match exactly, ignoring
/// case. Blank filters match everything.
pub fn filter_events<'a>(events: &'a [Event], filters: &EventFilters) -> Vec<&'a Event> {
    let wanted = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase)
    };
    let search = wanted(&filters.search);
    let category = wanted(&filters.category);
    let city = wanted(&filters.city);

    events
        .iter()
        .filter(|event| {
            search.as_deref().is_none_or(|needle| matches_search(event, needle))
                && category
                    .as_deref()
                    .is_none_or(|c| equals_ignore_case(event.category.as_deref(), c))
                && city
                    .as_deref()
                    .is_none_or(|c| equals_ignore_case(event.city.as_deref(), c))
        })
        .collect()
}

fn matches_search(event: &Event, needle: &str) -> bool {
    [
        Some(event.title.as_str()),
        event.description.as_deref(),
        event.venue_name.as_deref(),
        event.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .chain(event.tags.iter().map(String::as_str))
    .any(|text| text.to_lowercase().contains(needle))
}

fn equals_ignore_case(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.trim().to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registration(id: u64, date: Option<&str>, qr: Option<&str>) -> Registration {
        serde_json::from_value(json!({
            "id": id,
            "event": {"id": id * 10, "title": format!("Event {id}"), "date": date},
            "registration_code": format!("REG-{id}"),
            "qr_code": qr,
        }))
        .unwrap()
    }

    fn event(id: u64, title: &str, category: &str, city: &str) -> Event {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "category": category,
            "city": city,
            "tags": ["networking"],
        }))
        .unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ids(registrations: &[Registration]) -> Vec<u64> {
        registrations.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_partition_registrations_orders_both_sides() {
        let registrations = vec![
            registration(1, Some("2026-01-10"), None),
            registration(2, Some("2026-12-01"), None),
            registration(3, Some("2025-06-01"), None),
            registration(4, Some("2026-11-01"), None),
            registration(5, Some("2026-02-01"), None),
        ];

        let dashboard = partition_registrations(registrations, day("2026-10-19"));

        assert_eq!(ids(&dashboard.upcoming), [4, 2]);
        assert_eq!(ids(&dashboard.past), [5, 1, 3]);
    }

    #[test]
    fn test_partition_registrations_today_is_upcoming() {
        let registrations = vec![registration(1, Some("2026-10-19"), None)];

        let dashboard = partition_registrations(registrations, day("2026-10-19"));

        assert_eq!(ids(&dashboard.upcoming), [1]);
        assert!(dashboard.past.is_empty());
    }

    #[test]
    fn test_partition_registrations_undated_is_past_and_last() {
        let registrations = vec![
            registration(1, None, None),
            registration(2, Some("2020-01-01"), None),
        ];

        let dashboard = partition_registrations(registrations, day("2026-10-19"));

        assert_eq!(ids(&dashboard.past), [2, 1]);
    }

    #[test]
    fn test_with_qr_codes_skips_missing_and_empty() {
        let registrations = vec![
            registration(1, Some("2027-01-01"), Some("/media/qr/1.png")),
            registration(2, Some("2027-01-02"), Some("")),
            registration(3, Some("2020-01-01"), Some("/media/qr/3.png")),
            registration(4, Some("2020-01-02"), None),
        ];
        let dashboard = partition_registrations(registrations, day("2026-10-19"));

        let with_qr: Vec<u64> = dashboard.with_qr_codes().iter().map(|r| r.id).collect();

        assert_eq!(with_qr, [1, 3]);
    }

    #[test]
    fn test_qr_code_url_relative_and_absolute() {
        let relative = registration(1, None, Some("/media/qr/1.png"));
        let absolute = registration(2, None, Some("https://cdn.example.com/qr/2.png"));
        let missing = registration(3, None, None);

        assert_eq!(
            qr_code_url(&relative, "http://localhost:8000/").as_deref(),
            Some("http://localhost:8000/media/qr/1.png")
        );
        assert_eq!(
            qr_code_url(&absolute, "http://localhost:8000").as_deref(),
            Some("https://cdn.example.com/qr/2.png")
        );
        assert_eq!(qr_code_url(&missing, "http://localhost:8000"), None);
    }

    #[test]
    fn test_filter_events_by_search_category_city() {
        let events = vec![
            event(1, "RustConf", "Technology", "Lagos"),
            event(2, "Jazz Night", "Music", "Lagos"),
            event(3, "Rust Meetup", "Technology", "Accra"),
        ];

        let by_search = filter_events(
            &events,
            &EventFilters {
                search: Some("rust".into()),
                ..EventFilters::default()
            },
        );
        assert_eq!(by_search.iter().map(|e| e.id).collect::<Vec<_>>(), [1, 3]);

        let by_both = filter_events(
            &events,
            &EventFilters {
                category: Some("technology".into()),
                city: Some(" lagos ".into()),
                ..EventFilters::default()
            },
        );
        assert_eq!(by_both.iter().map(|e| e.id).collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn test_filter_events_matches_tags_and_blank_filters_match_all() {
        let events = vec![event(1, "RustConf", "Technology", "Lagos")];

        let by_tag = filter_events(
            &events,
            &EventFilters {
                search: Some("NETWORK".into()),
                ..EventFilters::default()
            },
        );
        assert_eq!(by_tag.len(), 1);

        let blank = filter_events(
            &events,
            &EventFilters {
                search: Some("   ".into()),
                category: Some(String::new()),
                city: None,
            },
        );
        assert_eq!(blank.len(), 1);
    }
}
