use chrono::NaiveDate;

/// Raw date layout in the extracts.
const SOURCE_FORMAT: &str = "%d/%m/%Y";
/// ISO calendar date written to the normalized files.
const TARGET_FORMAT: &str = "%Y-%m-%d";

/// Cells this short are placeholders, never dates.
pub const PLACEHOLDER_MAX_LEN: usize = 6;

/// A header names a date column if it contains `date` or is exactly `lcd`.
pub fn is_date_field(name: &str) -> bool {
    name.contains("date") || name == "lcd"
}

/// Positions of the date columns in `header`.
pub fn date_field_index<S: AsRef<str>>(header: &[S]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| is_date_field(name.as_ref()).then_some(idx))
        .collect()
}

/// Whether a cell in a date column should be reparsed.
pub fn needs_reparse(cell: &str) -> bool {
    cell.chars().count() > PLACEHOLDER_MAX_LEN
}

/// One or two digit day and month, four digit year, nothing around them.
/// chrono alone would also take signed or short years and leading spaces.
fn is_dmy_shape(cell: &str) -> bool {
    fn digits(s: &str, min: usize, max: usize) -> bool {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    }
    match cell.split('/').collect::<Vec<_>>().as_slice() {
        [d, m, y] => digits(d, 1, 2) && digits(m, 1, 2) && digits(y, 4, 4),
        _ => false,
    }
}

/// `"DD/MM/YYYY"` → `"YYYY-MM-DD"`. Returns None if the cell is not such a date.
pub fn reformat_dmy(cell: &str) -> Option<String> {
    if !is_dmy_shape(cell) {
        return None;
    }
    NaiveDate::parse_from_str(cell, SOURCE_FORMAT)
        .ok()
        .map(|d| d.format(TARGET_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_fields_by_name() {
        let header = ["patid", "regstartdate", "lcd", "Date", "lcd2", "enterdate"];
        assert_eq!(date_field_index(&header), vec![1, 2, 5]);
    }

    #[test]
    fn reformats_day_first_dates() {
        assert_eq!(reformat_dmy("01/01/1990").as_deref(), Some("1990-01-01"));
        assert_eq!(reformat_dmy("31/12/2023").as_deref(), Some("2023-12-31"));
        assert_eq!(reformat_dmy("29/02/2020").as_deref(), Some("2020-02-29"));
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(reformat_dmy("1990-01-01"), None);
        assert_eq!(reformat_dmy("12/31/2023"), None);
        assert_eq!(reformat_dmy("29/02/2021"), None);
        assert_eq!(reformat_dmy("01/01/1990 10:00"), None);
        assert_eq!(reformat_dmy("unknown"), None);
    }

    #[test]
    fn rejects_loose_years_and_padding() {
        for cell in ["01/01/90", "01/01/+1990", " 01/01/1990", "01/01/1990 ", "01/01/19900", "1/1/-990"] {
            assert_eq!(reformat_dmy(cell), None, "{cell:?}");
        }
        assert_eq!(reformat_dmy("1/2/1990").as_deref(), Some("1990-02-01"));
    }

    #[test]
    fn short_cells_are_placeholders() {
        assert!(!needs_reparse(""));
        assert!(!needs_reparse("000000"));
        assert!(needs_reparse("1/1/1990"));
        assert!(needs_reparse("0000000"));
    }
}
