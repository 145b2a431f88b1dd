use std::fmt;

use time::{Date, Time};

/// Quality code used by the station for a reading that passed control.
pub const APPROVED_CODE: &str = "G";

/// Code written back for readings that did not pass control.
const UNAPPROVED_CODE: &str = "Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Approved,
    Unapproved,
}

impl Quality {
    /// `G` is approved, every other code is not.
    pub fn from_code(code: &str) -> Self {
        if code == APPROVED_CODE {
            Self::Approved
        } else {
            Self::Unapproved
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Approved => APPROVED_CODE,
            Self::Unapproved => UNAPPROVED_CODE,
        }
    }
}

/// One hourly reading of the station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: Date,
    pub time: Time,
    /// Air temperature in degrees Celsius
    pub temperature: f32,
    pub quality: Quality,
}

impl Observation {
    pub fn new(date: Date, time: Time, temperature: f32, quality: Quality) -> Self {
        Self {
            date,
            time,
            temperature,
            quality,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.quality == Quality::Approved
    }
}

/// Same layout as the lines the loader reads: `date;time;temperature;code`.
impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{:02}:{:02}:{:02};{};{}",
            self.date,
            self.time.hour(),
            self.time.minute(),
            self.time.second(),
            self.temperature,
            self.quality.code()
        )
    }
}
