//! Date codec between the `MM-YYYY` API format and calendar dates
//!
//! The API speaks whole months while storage keeps full dates. Parsing a
//! month always yields the first day of that month, and formatting drops the
//! day again, so values that entered through [`parse_month`] round-trip
//! exactly.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Length of a `YYYY-MM-DD` date; stored values longer than this carry a
/// time suffix that is ignored.
const STORED_DATE_LEN: usize = 10;

/// Length of a `MM-YYYY` month
const MONTH_LEN: usize = 7;

/// Date parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("Invalid date '{input}': expected MM-YYYY")]
    InvalidMonthFormat { input: String },

    #[error("Invalid month {month} in '{input}': must be between 01 and 12")]
    MonthOutOfRange { input: String, month: u32 },

    #[error("Invalid stored date '{input}': expected YYYY-MM-DD")]
    InvalidStoredDate { input: String },
}

/// Parse an `MM-YYYY` month into the first day of that month
pub fn parse_month(text: &str) -> Result<NaiveDate, DateFormatError> {
    let invalid = || DateFormatError::InvalidMonthFormat {
        input: text.to_string(),
    };

    let bytes = text.as_bytes();
    let well_formed = bytes.len() == MONTH_LEN
        && bytes[2] == b'-'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);

    if !well_formed {
        return Err(invalid());
    }

    let month: u32 = text[..2].parse().map_err(|_| invalid())?;
    let year: i32 = text[3..].parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(DateFormatError::MonthOutOfRange {
            input: text.to_string(),
            month,
        });
    }

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Render a date as `MM-YYYY`, dropping the day of month
pub fn format_month(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}

/// Parse a stored `YYYY-MM-DD` date, ignoring any time suffix
pub fn parse_stored_date(text: &str) -> Result<NaiveDate, DateFormatError> {
    let invalid = || DateFormatError::InvalidStoredDate {
        input: text.to_string(),
    };

    let date_part = if text.len() > STORED_DATE_LEN {
        text.get(..STORED_DATE_LEN).ok_or_else(invalid)?
    } else {
        text
    };

    if date_part.len() != STORED_DATE_LEN {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())
}
