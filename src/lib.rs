mod consts;
mod prelude;
pub mod sales;
mod types;

pub use consts::*;
pub use sales::{AlbumSalesData, SalesError, SalesPlot, SalesSeries, generate_album_sales_plot};
pub use types::{Day, Month, Year, days_in_month, is_leap_year};

use crate::prelude::*;
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

/// A real day in the Gregorian calendar, as entered in `DD/MM/YYYY` form.
///
/// Every value has passed range validation: there is no 31st of February
/// and no rolling of overflowing days into the next month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}/{}/{}", day, month, year)]
pub struct CalendarDate {
    // field order gives chronological Ord
    year: Year,
    month: Month,
    day: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0:?} (expected DD/MM/YYYY)")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day:02}/{month:02}/{year:04}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

/// Parses a `DD/MM/YYYY` string into a calendar-valid date.
///
/// Returns `None` for anything that is not exactly two digits, `/`, two
/// digits, `/`, four digits, or that names a day which does not exist
/// (`"31/02/2020"`, `"29/02/2021"`, `"00/01/2020"`). Parse with
/// `input.parse::<CalendarDate>()` when the rejection reason matters.
pub fn validate_date(input: &str) -> Option<CalendarDate> {
    match input.parse::<CalendarDate>() {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::debug!(input, %err, "rejected date");
            None
        }
    }
}

impl CalendarDate {
    /// Creates a date from a year, a one-based month and a day.
    ///
    /// # Errors
    /// Returns the `ParseError` of the first component that is out of range.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        let year_nz = Year::new(year)?;
        let month_nz = Month::new(month)?;
        let day_nz = Day::new(day, year, month)?;
        Ok(Self::new(year_nz, month_nz, day_nz))
    }

    /// Creates a date from typed components.
    ///
    /// `Day` is validated against a specific month when it is built, so this
    /// re-checks the combination.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if `day` does not exist in `year`/`month`.
    pub fn from_parts(year: Year, month: Month, day: Day) -> Result<Self, ParseError> {
        let day = Day::new(day.get(), year.get(), month.get())?;
        Ok(Self::new(year, month, day))
    }

    const fn new(year: Year, month: Month, day: Day) -> Self {
        Self { year, month, day }
    }

    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    /// One-based month (January = 1)
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// Zero-based month (January = 0, December = 11)
    pub const fn month0(&self) -> u8 {
        self.month.get0()
    }

    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    pub const fn year_typed(&self) -> Year {
        self.year
    }

    pub const fn month_typed(&self) -> Month {
        self.month
    }

    pub const fn day_typed(&self) -> Day {
        self.day
    }

    /// Converts to a `chrono::NaiveDate` for time-axis arithmetic.
    ///
    /// `None` if chrono cannot represent the date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month()),
            u32::from(self.day()),
        )
    }
}

impl CalendarDate {
    fn parse_u16(s: &str) -> Result<u16, ParseError> {
        s.parse::<u16>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }

    fn parse_u8(s: &str) -> Result<u8, ParseError> {
        s.parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }

    /// Checks the fixed `DD/MM/YYYY` layout byte by byte.
    fn has_date_layout(s: &str) -> bool {
        s.len() == DATE_FORMAT_LEN
            && s.bytes().enumerate().all(|(i, b)| match i {
                2 | 5 => char::from(b) == DATE_SEPARATOR,
                _ => b.is_ascii_digit(),
            })
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        if !Self::has_date_layout(s) {
            return Err(ParseError::InvalidFormat(s.to_owned()));
        }

        // Layout check guarantees ASCII, so these byte slices are char boundaries
        let day_u8 = Self::parse_u8(&s[0..2])?;
        let month_u8 = Self::parse_u8(&s[3..5])?;
        let year_u16 = Self::parse_u16(&s[6..10])?;

        Self::from_ymd(year_u16, month_u8, day_u8)
    }
}

impl TryFrom<NaiveDate> for CalendarDate {
    type Error = ParseError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = u16::try_from(date.year())
            .map_err(|_| ParseError::InvalidFormat(date.to_string()))?;
        let month = u8::try_from(date.month())
            .map_err(|_| ParseError::InvalidFormat(date.to_string()))?;
        let day =
            u8::try_from(date.day()).map_err(|_| ParseError::InvalidFormat(date.to_string()))?;
        Self::from_ymd(year, month, day)
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_french_date() {
        let date = validate_date("25/12/2020").unwrap();
        assert_eq!(date.year(), 2020);
        assert_eq!(date.month0(), 11);
        assert_eq!(date.month(), 12);
        assert_eq!(date.day(), 25);
    }

    #[test]
    fn test_validate_iso_date_is_rejected() {
        assert_eq!(validate_date("2020-12-25"), None);
    }

    #[test]
    fn test_validate_overflowing_day_is_rejected() {
        assert_eq!(validate_date("31/02/2020"), None);
        assert_eq!(validate_date("31/04/2021"), None);
        assert_eq!(validate_date("32/01/2021"), None);
    }

    #[test]
    fn test_leap_year() {
        let date = validate_date("29/02/2020").unwrap();
        assert_eq!((date.year(), date.month0(), date.day()), (2020, 1, 29));

        assert_eq!(validate_date("29/02/2021"), None);
    }

    #[test]
    fn test_century_leap_rules() {
        assert_eq!(validate_date("29/02/1900"), None);
        assert!(validate_date("29/02/2000").is_some());
    }

    #[test]
    fn test_zero_components_are_rejected() {
        assert_eq!(validate_date("00/01/2020"), None);
        assert_eq!(validate_date("01/00/2020"), None);
        assert_eq!(validate_date("01/13/2020"), None);
        assert_eq!(validate_date("01/01/0000"), None);
    }

    #[test]
    fn test_layout_strictness() {
        let rejected = [
            "",
            "1/12/2020",
            "01/1/2020",
            "01/12/20",
            "01/12/02020",
            "01-12-2020",
            "01.12.2020",
            "01/12-2020",
            " 01/12/2020",
            "01/12/2020 ",
            "01/12/2020\n",
            "+1/12/2020",
            "0a/12/2020",
            "01/12/２０２０",
            "25/12/2020T00:00",
            "date: 25/12/2020",
        ];
        for input in rejected {
            assert_eq!(validate_date(input), None, "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_errors_carry_reason() {
        assert_eq!("".parse::<CalendarDate>(), Err(ParseError::EmptyInput));
        assert!(matches!(
            "2020-12-25".parse::<CalendarDate>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert_eq!(
            "01/13/2020".parse::<CalendarDate>(),
            Err(ParseError::InvalidMonth(13))
        );
        assert_eq!(
            "01/01/0000".parse::<CalendarDate>(),
            Err(ParseError::InvalidYear(0))
        );
        assert_eq!(
            "31/02/2020".parse::<CalendarDate>(),
            Err(ParseError::InvalidDay {
                year: 2020,
                month: 2,
                day: 31
            })
        );
    }

    #[test]
    fn test_error_display() {
        let err = "31/04/2021".parse::<CalendarDate>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid day 31/04/2021");
        assert_eq!(
            ParseError::InvalidMonth(13).to_string(),
            "Invalid month: 13 (must be 1-12)"
        );
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["01/01/0001", "25/12/2020", "29/02/2000", "31/12/9999"] {
            let date = validate_date(input).unwrap();
            assert_eq!(date.to_string(), input);
            assert_eq!(validate_date(&date.to_string()), Some(date));
        }
    }

    #[test]
    fn test_every_day_of_leap_year_round_trips() {
        let mut count = 0;
        for month in 1..=12 {
            for day in 1..=days_in_month(2024, Month::new(month).unwrap()) {
                let date = CalendarDate::from_ymd(2024, month, day).unwrap();
                let parsed = validate_date(&date.to_string()).unwrap();
                assert_eq!(parsed, date);
                assert_eq!(parsed.month0(), month - 1);
                count += 1;
            }
        }
        assert_eq!(count, 366);
    }

    #[test]
    fn test_from_ymd_and_parts() {
        let date = CalendarDate::from_ymd(2020, 12, 25).unwrap();
        assert_eq!(date.year_typed(), Year::new(2020).unwrap());
        assert_eq!(date.month_typed(), Month::new(12).unwrap());
        assert_eq!(date.day_typed().get(), 25);

        let day31 = Day::new(31, 2021, 1).unwrap();
        let april = Month::new(4).unwrap();
        assert!(CalendarDate::from_parts(Year::new(2021).unwrap(), april, day31).is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = validate_date("31/12/2019").unwrap();
        let b = validate_date("01/01/2020").unwrap();
        let c = validate_date("02/01/2020").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_naive_date_conversion() {
        let date = validate_date("29/02/2020").unwrap();
        let naive = date.to_naive_date().unwrap();
        assert_eq!(naive, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(CalendarDate::try_from(naive).unwrap(), date);

        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        assert!(CalendarDate::try_from(far).is_err());
    }

    #[test]
    fn test_serde_string_format() {
        let date = validate_date("25/12/2020").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, r#""25/12/2020""#);
        let parsed: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, date);
    }

    #[test]
    fn test_serde_validation() {
        for json in [r#""31/02/2020""#, r#""2020-12-25""#, r#""00/01/2020""#, "20201225"] {
            let result: Result<CalendarDate, _> = serde_json::from_str(json);
            assert!(result.is_err(), "{json} should be rejected");
        }
    }

    #[test]
    fn test_validate_is_thread_safe() {
        let handles: Vec<_> = (1..=28u8)
            .map(|day| {
                std::thread::spawn(move || validate_date(&format!("{day:02}/02/2021")))
            })
            .collect();
        for (day, handle) in (1..=28u8).zip(handles) {
            assert_eq!(handle.join().unwrap().map(|d| d.day()), Some(day));
        }
    }
}
