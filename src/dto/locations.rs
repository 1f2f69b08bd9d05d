//! Locations table rows, counters and the delete confirmation text.

use serde::Serialize;

use crate::domain::location::Location;
use crate::dto::tags::{self, Tag};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocationRow {
    pub id: String,
    pub short_id: String,
    pub name: String,
    pub status: Tag,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Location> for LocationRow {
    fn from(location: &Location) -> Self {
        let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
            d.map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        };
        Self {
            id: location.id.to_string(),
            short_id: short_id(location.id.as_str()),
            name: location.name.clone(),
            status: tags::active_tag(location.is_active),
            created_at: date(location.created_at),
            updated_at: date(location.updated_at),
        }
    }
}

/// First eight characters of an identifier followed by `...`.
pub fn short_id(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct LocationStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl LocationStats {
    pub fn from_locations(locations: &[Location]) -> Self {
        let active = locations.iter().filter(|l| l.is_active).count();
        Self {
            total: locations.len(),
            active,
            inactive: locations.len() - active,
        }
    }
}

/// Match counter shown under the search box; `None` when no search is active.
pub fn search_summary(search: &str, matches: u64) -> Option<String> {
    if search.trim().is_empty() {
        None
    } else {
        Some(format!("Found {matches} location(s)"))
    }
}

/// Confirmation shown before deleting a location that profiles still use.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub title: &'static str,
    pub message: String,
    pub confirm_label: &'static str,
}

impl DeleteConfirmation {
    pub fn for_usage(user_count: u64) -> Self {
        Self {
            title: "Location in Use",
            message: format!(
                "This location is currently being used by {user_count} profile(s)."
            ),
            confirm_label: "Yes, Delete Anyway",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LocationId;

    fn location(id: &str, active: bool) -> Location {
        Location {
            id: LocationId::new(id).unwrap(),
            name: "Noida".into(),
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn row_shortens_id_and_tags_status() {
        let row = LocationRow::from(&location("0f8c2d9a-1111-2222", false));

        assert_eq!(row.short_id, "0f8c2d9a...");
        assert_eq!(row.status.label, "Inactive");
        assert_eq!(row.created_at, "N/A");
    }

    #[test]
    fn stats_count_active_and_inactive() {
        let stats = LocationStats::from_locations(&[
            location("a", true),
            location("b", false),
            location("c", true),
        ]);

        assert_eq!(
            stats,
            LocationStats {
                total: 3,
                active: 2,
                inactive: 1
            }
        );
    }

    #[test]
    fn summary_and_confirmation_texts() {
        assert_eq!(search_summary("  ", 4), None);
        assert_eq!(search_summary("no", 1).as_deref(), Some("Found 1 location(s)"));
        assert_eq!(
            DeleteConfirmation::for_usage(3).message,
            "This location is currently being used by 3 profile(s)."
        );
    }
}
