//! Field-by-field mapping between [`PackageRecord`] and a spreadsheet row.
//!
//! Owns the canonical column set the CSV format supports. Encoding always
//! emits every column (empty string / "No" for absent values, never a
//! null-ish placeholder); decoding is the exact inverse over the flat subset
//! and resets the structural fields a spreadsheet cannot express.
//!
//! Conventions on the wire:
//! - booleans: "Yes" / "No" out, case-insensitive "yes" in
//! - lists: ", "-joined out, comma-split and trimmed in
//! - numbers: decimal text out, defaulting to 0 on unparsable input

use crate::csv::SpreadsheetRow;
use crate::models::{CategoryRef, PackageRecord};

/// Canonical column set, in export order. The serializer always uses this
/// constant as the header rather than deriving it from data, so column
/// order can never drift between rows or between exports.
pub const COLUMNS: [&str; 27] = [
    "Name",
    "Description",
    "Overview",
    "Duration",
    "Original Price",
    "Offer Price",
    "Advance Payment",
    "City",
    "State",
    "Region",
    "Category",
    "Max Participants",
    "Is Active",
    "Is Featured",
    "Start Date",
    "End Date",
    "Trip Type",
    "Season",
    "Rating",
    "Views",
    "Bookings Count",
    "Tags",
    "Labels",
    "Standout Reason",
    "Is New",
    "Is Trending",
    "Trending Score",
];

// =============================================================================
// Encoding (record -> row)
// =============================================================================

/// Encode a package into one spreadsheet row. Every column in [`COLUMNS`]
/// is present in the result.
pub fn encode(record: &PackageRecord) -> SpreadsheetRow {
    let mut row = SpreadsheetRow::new();
    let mut set = |col: &str, value: String| {
        row.insert(col.to_string(), value);
    };

    set("Name", record.name.clone());
    set("Description", record.description.clone());
    set("Overview", record.overview.clone());
    set("Duration", record.duration.clone());
    set("Original Price", record.original_price.clone());
    set("Offer Price", record.offer_price.clone());
    set("Advance Payment", record.advance_payment.clone());
    set("City", record.city.clone());
    set("State", record.state.clone());
    set("Region", record.region.clone());
    // Prefer the populated object's name over a raw id.
    set("Category", record.category.display_name().to_string());
    set("Max Participants", record.max_participants.clone());
    set("Is Active", bool_cell(record.is_active));
    set("Is Featured", bool_cell(record.is_featured));
    set("Start Date", record.start_date.clone());
    set("End Date", record.end_date.clone());
    set("Trip Type", record.trip_type.clone());
    set("Season", record.season.clone());
    set("Rating", float_cell(record.rating));
    set("Views", record.views.to_string());
    set("Bookings Count", record.bookings_count.to_string());
    set("Tags", record.tags.join(", "));
    set("Labels", record.labels.join(", "));
    set("Standout Reason", record.standout_reason.clone());
    set("Is New", bool_cell(record.is_new));
    set("Is Trending", bool_cell(record.is_trending));
    set("Trending Score", float_cell(record.trending_score));

    row
}

// =============================================================================
// Decoding (row -> record)
// =============================================================================

/// Decode one spreadsheet row into a package.
///
/// Structural fields (itinerary, images, inclusions, ...) are always
/// initialized to their empty shape: the CSV format cannot express them,
/// so a decoded record never inherits them from anywhere.
pub fn decode(row: &SpreadsheetRow) -> PackageRecord {
    let cell = |col: &str| row.get(col).cloned().unwrap_or_default();

    PackageRecord {
        name: cell("Name"),
        description: cell("Description"),
        overview: cell("Overview"),
        duration: cell("Duration"),
        original_price: cell("Original Price"),
        offer_price: cell("Offer Price"),
        advance_payment: cell("Advance Payment"),
        city: cell("City"),
        state: cell("State"),
        region: cell("Region"),
        category: CategoryRef::Plain(cell("Category")),
        max_participants: cell("Max Participants"),
        is_active: cell_bool(&cell("Is Active")),
        is_featured: cell_bool(&cell("Is Featured")),
        is_new: cell_bool(&cell("Is New")),
        is_trending: cell_bool(&cell("Is Trending")),
        start_date: cell("Start Date"),
        end_date: cell("End Date"),
        trip_type: cell("Trip Type"),
        season: cell("Season"),
        rating: cell_float(&cell("Rating")),
        views: cell_int(&cell("Views")),
        bookings_count: cell_int(&cell("Bookings Count")),
        tags: cell_list(&cell("Tags")),
        labels: cell_list(&cell("Labels")),
        standout_reason: cell("Standout Reason"),
        trending_score: cell_float(&cell("Trending Score")),
        ..PackageRecord::default()
    }
}

// =============================================================================
// Cell conversions
// =============================================================================

fn bool_cell(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// Non-finite floats encode as empty string; "NaN" must never reach a cell.
fn float_cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

/// Case-insensitive "yes" is true; anything else, including empty, is false.
fn cell_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn cell_float(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

fn cell_int(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// An empty cell decodes to an empty list, never `[""]`.
fn cell_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(',').map(|s| s.trim().to_string()).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PackageRecord {
        PackageRecord {
            name: "Manali Escape".into(),
            description: "Five days in the mountains".into(),
            overview: "Snow and cafes".into(),
            duration: "5D/4N".into(),
            original_price: "15999".into(),
            offer_price: "12999".into(),
            advance_payment: "2000".into(),
            city: "Manali".into(),
            state: "Himachal Pradesh".into(),
            region: "North".into(),
            category: CategoryRef::Plain("Trekking".into()),
            max_participants: "20".into(),
            is_active: true,
            is_featured: false,
            is_new: true,
            is_trending: false,
            start_date: "2026-01-10".into(),
            end_date: "2026-01-15".into(),
            trip_type: "Group".into(),
            season: "Winter".into(),
            rating: 4.5,
            views: 320,
            bookings_count: 12,
            tags: vec!["snow".into(), "trek".into()],
            labels: vec!["Best Seller".into()],
            standout_reason: "Highest rated".into(),
            trending_score: 7.25,
            ..PackageRecord::default()
        }
    }

    #[test]
    fn test_encode_covers_every_column() {
        let row = encode(&sample_record());
        for col in COLUMNS {
            assert!(row.contains_key(col), "missing column {col}");
        }
        assert_eq!(row.len(), COLUMNS.len());
    }

    #[test]
    fn test_encode_defaults_never_nullish() {
        let row = encode(&PackageRecord::default());
        assert_eq!(row["Name"], "");
        assert_eq!(row["Is Active"], "No");
        assert_eq!(row["Rating"], "0");
        assert_eq!(row["Tags"], "");
    }

    #[test]
    fn test_encode_prefers_category_object_name() {
        let record = PackageRecord {
            category: CategoryRef::Full { id: "64fa12".into(), name: "Char Dham".into() },
            ..PackageRecord::default()
        };
        assert_eq!(encode(&record)["Category"], "Char Dham");
    }

    #[test]
    fn test_encode_guards_non_finite_floats() {
        let record = PackageRecord { rating: f64::NAN, trending_score: f64::INFINITY, ..PackageRecord::default() };
        let row = encode(&record);
        assert_eq!(row["Rating"], "");
        assert_eq!(row["Trending Score"], "");
    }

    #[test]
    fn test_decode_booleans_case_insensitive_yes_only() {
        assert!(cell_bool("Yes"));
        assert!(cell_bool("YES"));
        assert!(!cell_bool("No"));
        assert!(!cell_bool("maybe"));
        assert!(!cell_bool(""));
    }

    #[test]
    fn test_decode_empty_list_is_empty_vec() {
        assert!(cell_list("").is_empty());
        assert!(cell_list("  ").is_empty());
        assert_eq!(cell_list("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_decode_numbers_default_to_zero() {
        assert_eq!(cell_float("abc"), 0.0);
        assert_eq!(cell_float("4.5"), 4.5);
        assert_eq!(cell_int("12"), 12);
        assert_eq!(cell_int("twelve"), 0);
    }

    #[test]
    fn test_decode_resets_structural_fields() {
        let mut row = SpreadsheetRow::new();
        row.insert("Name".into(), "Trip".into());
        let record = decode(&row);
        assert!(record.itinerary.is_empty());
        assert!(record.inclusions.is_empty());
        assert!(record.images.is_empty());
        assert!(record.trek_info.is_null());
        assert!(record.pdf.is_none());
    }

    #[test]
    fn test_round_trip_flat_subset() {
        let record = sample_record();
        let decoded = decode(&encode(&record));
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_round_trip_collapses_category_to_name() {
        let record = PackageRecord {
            category: CategoryRef::Full { id: "64fa12".into(), name: "Char Dham".into() },
            ..sample_record()
        };
        let decoded = decode(&encode(&record));
        assert_eq!(decoded.category, CategoryRef::Plain("Char Dham".into()));
    }

    #[test]
    fn test_decoded_row_has_real_types() {
        let sheet = crate::csv::parse(
            "Name,Is Active,Tags,Rating\nTrip,Yes,\"snow, trek\",4.5",
        );
        let record = decode(&sheet.rows[0]);
        assert!(record.is_active);
        assert_eq!(record.tags, vec!["snow", "trek"]);
        assert_eq!(record.rating, 4.5);
    }
}
