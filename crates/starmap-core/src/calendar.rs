//! The simulated calendar that timeline queries run against.

use crate::config::CalendarConfig;

/// Inclusive year bounds for queries and new events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    min_year: i32,
    max_year: i32,
}

impl Calendar {
    /// Build a calendar; inverted bounds are swapped.
    pub const fn new(min_year: i32, max_year: i32) -> Self {
        if min_year <= max_year {
            Self { min_year, max_year }
        } else {
            Self {
                min_year: max_year,
                max_year: min_year,
            }
        }
    }

    /// Earliest selectable year.
    pub const fn min_year(self) -> i32 {
        self.min_year
    }

    /// Latest selectable year.
    pub const fn max_year(self) -> i32 {
        self.max_year
    }

    /// Clamp `year` into the calendar.
    pub fn clamp(self, year: i32) -> i32 {
        year.clamp(self.min_year, self.max_year)
    }

    /// True when `year` lies inside the calendar.
    pub const fn contains(self, year: i32) -> bool {
        year >= self.min_year && year <= self.max_year
    }

    /// Interpret free-text year input. Unparseable input keeps `current`;
    /// out-of-range input is clamped.
    pub fn parse_input(self, input: &str, current: i32) -> i32 {
        input
            .trim()
            .parse::<i64>()
            .map_or(current, |year| {
                let clamped = year.clamp(i64::from(self.min_year), i64::from(self.max_year));
                i32::try_from(clamped).unwrap_or(current)
            })
    }
}

impl Default for Calendar {
    fn default() -> Self {
        CalendarConfig::default().into()
    }
}

impl From<CalendarConfig> for Calendar {
    fn from(config: CalendarConfig) -> Self {
        Self::new(config.min_year, config.max_year)
    }
}
