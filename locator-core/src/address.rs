//! Address extraction from location records

use crate::types::LocationRecord;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const MISSING_LOCATION_DATA: &str = "Failed: Missing location data";
pub const NO_LOCATION: &str = "Failed: No location";

const PERIODS: [(&str, i64); 6] = [
    ("year", 60 * 60 * 24 * 365),
    ("month", 60 * 60 * 24 * 30),
    ("day", 60 * 60 * 24),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Human-readable address of one location record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressRecord {
    Found {
        address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_updated: Option<String>,
    },
    Missing {
        error: String,
    },
}

/// Result of an indexed address lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressLookup {
    Single(AddressRecord),
    /// Every record keyed by its 0-based position
    All(BTreeMap<usize, AddressRecord>),
    Failed { error: String },
}

impl AddressLookup {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            AddressLookup::Failed { .. } | AddressLookup::Single(AddressRecord::Missing { .. })
        )
    }
}

/// Format an elapsed interval as e.g. `"2 hours, 5 minutes"`.
///
/// Zero and negative intervals format as the empty string.
pub fn td_format(delta: TimeDelta) -> String {
    let mut seconds = delta.num_seconds();
    let mut parts = Vec::new();

    for (name, period) in PERIODS {
        if seconds >= period {
            let value = seconds / period;
            seconds %= period;
            let plural = if value > 1 { "s" } else { "" };
            parts.push(format!("{} {}{}", value, name, plural));
        }
    }

    parts.join(", ")
}

/// Extract the address of `record`, measuring staleness against `now`
pub fn extract_address(record: &LocationRecord, now: DateTime<Utc>) -> AddressRecord {
    let lines = record.address_lines();
    if lines.is_empty() {
        info!(record = ?record.location, "Missing data in location record");
        return AddressRecord::Missing {
            error: MISSING_LOCATION_DATA.to_string(),
        };
    }

    let address = lines.join(" ");
    let then = record
        .location
        .as_ref()
        .and_then(|loc| loc.timestamp)
        .filter(|ts| *ts != 0)
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    match then {
        Some(then) => AddressRecord::Found {
            address,
            timestamp: Some(then.format("%Y-%m-%d %H:%M:%S").to_string()),
            last_updated: Some(td_format(now - then)),
        },
        None => AddressRecord::Found {
            address,
            timestamp: None,
            last_updated: None,
        },
    }
}

/// Look up a 1-based `idx` in `locations`.
///
/// An index below 1 selects every record.
pub fn lookup_address(
    locations: Option<&[LocationRecord]>,
    idx: i64,
    now: DateTime<Utc>,
) -> AddressLookup {
    let locations = match locations {
        Some(locations) if !locations.is_empty() => locations,
        _ => {
            return AddressLookup::Failed {
                error: NO_LOCATION.to_string(),
            }
        }
    };

    if idx < 1 {
        return AddressLookup::All(
            locations
                .iter()
                .enumerate()
                .map(|(i, record)| (i, extract_address(record, now)))
                .collect(),
        );
    }

    let record = usize::try_from(idx - 1)
        .ok()
        .and_then(|position| locations.get(position));
    match record {
        Some(record) => AddressLookup::Single(extract_address(record, now)),
        None => AddressLookup::Failed {
            error: format!(
                "Failed: Index ({}) out of range ({})",
                idx,
                locations.len()
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, PostalAddress};
    use chrono::TimeZone;
    use serde_json::json;

    fn record(lines: &[&str], timestamp: Option<i64>) -> LocationRecord {
        LocationRecord {
            location: Some(Location {
                address: Some(PostalAddress {
                    formatted_address_lines: lines.iter().map(|l| l.to_string()).collect(),
                    ..Default::default()
                }),
                timestamp,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_td_format() {
        assert_eq!(td_format(TimeDelta::zero()), "");
        assert_eq!(td_format(TimeDelta::seconds(90)), "1 minute, 30 seconds");
        assert_eq!(td_format(TimeDelta::seconds(3600)), "1 hour");
        assert_eq!(
            td_format(TimeDelta::seconds(2 * 3600 + 5 * 60)),
            "2 hours, 5 minutes"
        );
        assert_eq!(
            td_format(TimeDelta::days(400)),
            "1 year, 1 month, 5 days"
        );
        assert_eq!(td_format(TimeDelta::seconds(-30)), "");
    }

    #[test]
    fn test_td_format_ignores_subsecond() {
        assert_eq!(td_format(TimeDelta::milliseconds(1999)), "1 second");
        assert_eq!(td_format(TimeDelta::milliseconds(999)), "");
    }

    #[test]
    fn test_extract_address_with_timestamp() {
        let then = now() - TimeDelta::seconds(2 * 3600 + 5 * 60);
        let rec = record(
            &["1 Infinite Loop", "Cupertino, CA"],
            Some(then.timestamp_millis()),
        );

        assert_eq!(
            extract_address(&rec, now()),
            AddressRecord::Found {
                address: "1 Infinite Loop Cupertino, CA".to_string(),
                timestamp: Some("2024-03-01 09:55:00".to_string()),
                last_updated: Some("2 hours, 5 minutes".to_string()),
            }
        );
    }

    #[test]
    fn test_extract_address_without_timestamp() {
        let value = serde_json::to_value(extract_address(&record(&["Main St"], None), now()))
            .unwrap();
        assert_eq!(value, json!({"address": "Main St"}));

        let value = serde_json::to_value(extract_address(&record(&["Main St"], Some(0)), now()))
            .unwrap();
        assert_eq!(value, json!({"address": "Main St"}));
    }

    #[test]
    fn test_extract_address_missing_data() {
        let expected = json!({"error": "Failed: Missing location data"});
        for rec in [
            LocationRecord::default(),
            record(&[], Some(1)),
            LocationRecord {
                location: Some(Location::default()),
                ..Default::default()
            },
        ] {
            let value = serde_json::to_value(extract_address(&rec, now())).unwrap();
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn test_lookup_single_and_out_of_range() {
        let locations = vec![record(&["A"], None), record(&["B"], None)];

        assert_eq!(
            serde_json::to_value(lookup_address(Some(locations.as_slice()), 2, now())).unwrap(),
            json!({"address": "B"})
        );
        assert_eq!(
            serde_json::to_value(lookup_address(Some(locations.as_slice()), 3, now())).unwrap(),
            json!({"error": "Failed: Index (3) out of range (2)"})
        );
    }

    #[test]
    fn test_lookup_all_below_one() {
        let locations = vec![record(&["A"], None), LocationRecord::default()];

        for idx in [0, -4, i64::MIN] {
            let value =
                serde_json::to_value(lookup_address(Some(locations.as_slice()), idx, now())).unwrap();
            assert_eq!(
                value,
                json!({
                    "0": {"address": "A"},
                    "1": {"error": "Failed: Missing location data"}
                })
            );
        }
    }

    #[test]
    fn test_lookup_extreme_index_is_out_of_range() {
        let locations = vec![record(&["A"], None)];
        assert_eq!(
            serde_json::to_value(lookup_address(Some(locations.as_slice()), i64::MAX, now()))
                .unwrap(),
            json!({"error": format!("Failed: Index ({}) out of range (1)", i64::MAX)})
        );
    }

    #[test]
    fn test_lookup_without_locations() {
        let expected = AddressLookup::Failed {
            error: NO_LOCATION.to_string(),
        };
        assert_eq!(lookup_address(None, 1, now()), expected);
        assert_eq!(lookup_address(Some(&[] as &[LocationRecord]), 1, now()), expected);
        assert!(expected.is_error());
    }
}
