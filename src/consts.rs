/// Maximum valid year (inclusive), the largest four-digit year
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days, leap years are handled by `days_in_month`
pub const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// English month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
pub(crate) const CENTURY_CYCLE: u16 = 100;
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Separator between day, month and year in `DD/MM/YYYY`
pub const DATE_SEPARATOR: char = '/';
/// Exact byte length of a `DD/MM/YYYY` string
pub const DATE_FORMAT_LEN: usize = 10;
