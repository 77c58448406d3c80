use crate::ParseError;
use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE,
    MAX_MONTH, MAX_YEAR, MIN_DAY, MONTH_NAMES,
};
use std::fmt;
use std::num::{NonZeroU8, NonZeroU16};

/// A year value guaranteed to be in the range `1..=MAX_YEAR` (1..=9999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(NonZeroU16);

impl Year {
    /// Creates a new Year, validating that it's non-zero and <= `MAX_YEAR`
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` if the value is 0 or > `MAX_YEAR`.
    pub fn new(value: u16) -> Result<Self, ParseError> {
        let non_zero = NonZeroU16::new(value).ok_or(ParseError::InvalidYear(value))?;
        if value > MAX_YEAR {
            return Err(ParseError::InvalidYear(value));
        }
        Ok(Self(non_zero))
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    pub const fn is_leap(self) -> bool {
        is_leap_year(self.get())
    }
}

impl TryFrom<u16> for Year {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.get()
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.get())
    }
}

/// A calendar month, stored one-based (January = 1).
///
/// Callers that follow the zero-based convention of most date objects
/// should read it through [`Month::get0`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NonZeroU8);

impl Month {
    /// Creates a new Month from its one-based number
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` if the value is 0 or > `MAX_MONTH`.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        let non_zero = NonZeroU8::new(value).ok_or(ParseError::InvalidMonth(value))?;
        if value > MAX_MONTH {
            return Err(ParseError::InvalidMonth(value));
        }
        Ok(Self(non_zero))
    }

    /// One-based month number (January = 1)
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Zero-based month number (January = 0, December = 11)
    #[inline]
    pub const fn get0(self) -> u8 {
        self.0.get() - 1
    }

    /// English full name, e.g. `"December"`
    pub const fn name(self) -> &'static str {
        MONTH_NAMES[self.get0() as usize]
    }

    /// Looks up a month by its English full name, ignoring case and
    /// surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        MONTH_NAMES
            .iter()
            .zip(1..=MAX_MONTH)
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .and_then(|(_, number)| NonZeroU8::new(number))
            .map(Self)
    }
}

impl TryFrom<u8> for Month {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.get())
    }
}

/// A day value guaranteed to exist in its year and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NonZeroU8);

impl Day {
    /// Creates a new Day, validating it against the length of the given month.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if the value is 0, past the end of the
    /// month, or `month` is outside `1..=MAX_MONTH`.
    pub fn new(value: u8, year: u16, month: u8) -> Result<Self, ParseError> {
        let invalid = ParseError::InvalidDay {
            year,
            month,
            day: value,
        };
        let Ok(month) = Month::new(month) else {
            return Err(invalid);
        };
        if value < MIN_DAY || value > days_in_month(year, month) {
            return Err(invalid);
        }
        let non_zero = NonZeroU8::new(value).ok_or(invalid)?;
        Ok(Self(non_zero))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> Self {
        day.get()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.get())
    }
}

pub const fn is_leap_year(year: u16) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Number of days in `month` of `year`, 28 to 31.
pub const fn days_in_month(year: u16, month: Month) -> u8 {
    if month.get() == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month.get() as usize]
    }
}
