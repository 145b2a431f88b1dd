use std::fmt;

use time::Date;

use crate::{error::QueryError, observation::Observation, store::ObservationStore};

/// A full day has one reading per hour.
pub const EXPECTED_READINGS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAverage {
    pub date: Date,
    /// Rounded to two decimals
    pub temperature: f64,
}

impl fmt::Display for DailyAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} average temperature: {:.2} degrees Celsius",
            self.date, self.temperature
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingValues {
    pub date: Date,
    pub missing: usize,
}

impl fmt::Display for MissingValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} missing {} values", self.date, self.missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApprovalRate {
    pub from: Date,
    pub to: Date,
    /// Between 0 and 100, rounded to two decimals
    pub percentage: f64,
}

impl fmt::Display for ApprovalRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Approved values between {} and {}: {:.2} %",
            self.from, self.to, self.percentage
        )
    }
}

impl ObservationStore {
    /// Average temperature of every day between `from` and `to` (inclusive),
    /// sorted by date.
    pub fn average_per_day(&self, from: Date, to: Date) -> Result<Vec<DailyAverage>, QueryError> {
        let days = self
            .index_range(from, to)
            .and_then(|range| self.group_by_date(range))
            .inspect_err(|e| log::warn!("Cannot compute averages: {e}"))?;

        log::debug!("averaging {} days between {from} and {to}", days.len());

        Ok(days
            .into_iter()
            .map(|(date, temperatures)| {
                let sum: f64 = temperatures.iter().map(|&t| f64::from(t)).sum();
                DailyAverage {
                    date,
                    temperature: round_half_up(sum / temperatures.len() as f64),
                }
            })
            .collect())
    }

    /// Number of hourly readings missing for every day between `from` and `to`
    /// (inclusive), sorted by number of missing readings, most first. Days
    /// missing the same number of readings stay sorted by date.
    pub fn missing_per_day(&self, from: Date, to: Date) -> Result<Vec<MissingValues>, QueryError> {
        let days = self
            .index_range(from, to)
            .and_then(|range| self.group_by_date(range))
            .inspect_err(|e| log::warn!("Cannot count missing values: {e}"))?;

        let mut missing: Vec<MissingValues> = days
            .into_iter()
            .map(|(date, temperatures)| {
                if temperatures.len() > EXPECTED_READINGS_PER_DAY {
                    log::warn!(
                        "{date} has {} readings, more than one per hour",
                        temperatures.len()
                    );
                }
                MissingValues {
                    date,
                    missing: EXPECTED_READINGS_PER_DAY.saturating_sub(temperatures.len()),
                }
            })
            .collect();

        // stable, so equal counts keep the ascending date order of the buckets
        missing.sort_by(|left, right| right.missing.cmp(&left.missing));

        Ok(missing)
    }

    /// Share of approved readings between `from` and `to` (inclusive).
    pub fn approved_percentage(&self, from: Date, to: Date) -> Result<ApprovalRate, QueryError> {
        self.index_range(from, to)
            .and_then(|range| self.slice(range))
            .and_then(|observations| approval_rate(observations, from, to))
            .inspect_err(|e| log::warn!("Cannot compute approval rate: {e}"))
    }
}

/// Only reachable with an empty slice through direct calls: a resolved index
/// range always holds at least one observation.
fn approval_rate(
    observations: &[Observation],
    from: Date,
    to: Date,
) -> Result<ApprovalRate, QueryError> {
    if observations.is_empty() {
        return Err(QueryError::NoObservations { from, to });
    }

    let approved = observations.iter().filter(|obs| obs.is_approved()).count();
    let percentage = approved as f64 / observations.len() as f64 * 100.0;

    Ok(ApprovalRate {
        from,
        to,
        percentage: round_half_up(percentage),
    })
}

/// Rounds to two decimals, ties away from zero.
///
/// Works on the shortest decimal representation of `value` rather than on its
/// binary one, so `2.255` becomes `2.26` even though the closest `f64` is
/// slightly below `2.255`.
pub fn round_half_up(value: f64) -> f64 {
    const SCALE: usize = 2;

    if !value.is_finite() {
        return value;
    }
    // -0.0 would print as `-0.00`
    if value == 0.0 {
        return 0.0;
    }

    let repr = value.abs().to_string();
    let (integer, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if fraction.len() <= SCALE {
        return value;
    }

    let kept = format!("{integer}{}", &fraction[..SCALE]);
    let Ok(mut scaled) = kept.parse::<u64>() else {
        // too large to carry any meaningful decimal anyway
        return value;
    };
    if fraction.as_bytes()[SCALE] >= b'5' {
        scaled += 1;
    }

    if scaled == 0 {
        return 0.0;
    }

    (scaled as f64 / 100.0).copysign(value)
}

#[cfg(test)]
mod tests {
    use time::{
        macros::{date, time},
        Duration, Time,
    };

    use super::*;
    use crate::{observation::Quality, store::StoreBuilder};

    fn build_store(days: &[&[(f32, Quality)]]) -> ObservationStore {
        let mut builder = StoreBuilder::new();
        let mut date = date!(2000 - 01 - 01);
        for readings in days {
            for (hour, &(temperature, quality)) in readings.iter().enumerate() {
                let time = Time::from_hms(hour as u8 % 24, 0, 0).unwrap();
                builder.push(Observation::new(date, time, temperature, quality));
            }
            date += Duration::days(1);
        }
        builder.build().unwrap()
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(2.255), 2.26);
        assert_eq!(round_half_up(2.254), 2.25);
        assert_eq!(round_half_up(2.2549999), 2.25);
        assert_eq!(round_half_up(0.125), 0.13);
        assert_eq!(round_half_up(32.857142857142854), 32.86);
        assert_eq!(round_half_up(-1.005), -1.01);
        assert_eq!(format!("{:.2}", round_half_up(-0.004)), "0.00");
        assert_eq!(format!("{:.2}", round_half_up(-0.0)), "0.00");
        assert_eq!(format!("{:.2}", round_half_up(-0.005)), "-0.01");
        assert_eq!(round_half_up(99.995), 100.0);
        assert_eq!(round_half_up(7.0), 7.0);
        assert_eq!(round_half_up(7.1), 7.1);
        assert_eq!(round_half_up(0.0), 0.0);
    }

    #[test]
    fn averages_are_rounded_per_day() {
        use Quality::*;
        let store = build_store(&[
            &[(1.0, Approved), (2.0, Approved), (2.0, Approved)],
            &[(-3.5, Approved), (-1.0, Unapproved)],
            &[(10.0, Approved)],
        ]);

        let averages = store
            .average_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 03))
            .unwrap();
        let lines: Vec<String> = averages.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "2000-01-01 average temperature: 1.67 degrees Celsius",
                "2000-01-02 average temperature: -2.25 degrees Celsius",
                "2000-01-03 average temperature: 10.00 degrees Celsius",
            ]
        );
    }

    #[test]
    fn average_rounded_to_zero_is_not_negative() {
        use Quality::*;
        let store = build_store(&[&[(-0.1, Approved), (0.1, Approved), (-0.01, Approved)]]);

        let averages = store
            .average_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 01))
            .unwrap();
        assert_eq!(
            averages[0].to_string(),
            "2000-01-01 average temperature: 0.00 degrees Celsius"
        );
    }

    #[test]
    fn approval_rate_of_nothing_fails() {
        let (from, to) = (date!(2000 - 01 - 01), date!(2000 - 01 - 02));
        assert_eq!(
            super::approval_rate(&[], from, to),
            Err(QueryError::NoObservations { from, to })
        );
    }

    #[test]
    fn average_of_a_sub_range() {
        use Quality::*;
        let store = build_store(&[&[(1.0, Approved)], &[(2.0, Approved)], &[(3.0, Approved)]]);

        let averages = store
            .average_per_day(date!(2000 - 01 - 02), date!(2000 - 01 - 02))
            .unwrap();
        assert_eq!(
            averages,
            vec![DailyAverage {
                date: date!(2000 - 01 - 02),
                temperature: 2.0
            }]
        );
    }

    #[test]
    fn queries_fail_outside_the_data() {
        use Quality::*;
        let store = build_store(&[&[(1.0, Approved)], &[(2.0, Approved)]]);

        assert_eq!(
            store.average_per_day(date!(1999 - 12 - 31), date!(2000 - 01 - 02)),
            Err(QueryError::DateNotFound(date!(1999 - 12 - 31)))
        );
        assert_eq!(
            store.missing_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 05)),
            Err(QueryError::DateNotFound(date!(2000 - 01 - 05)))
        );
        assert_eq!(
            store.approved_percentage(date!(2000 - 01 - 02), date!(2000 - 01 - 01)),
            Err(QueryError::InvertedRange {
                from: date!(2000 - 01 - 02),
                to: date!(2000 - 01 - 01)
            })
        );

        let empty = ObservationStore::default();
        assert_eq!(
            empty.approved_percentage(date!(2000 - 01 - 01), date!(2000 - 01 - 01)),
            Err(QueryError::DateNotFound(date!(2000 - 01 - 01)))
        );
    }

    #[test]
    fn missing_values_sorted_by_count() {
        let full = [(0.0, Quality::Approved); 24];
        let store = build_store(&[&full[..20], &full[..], &full[..23], &full[..20], &full[..1]]);

        let missing = store
            .missing_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 05))
            .unwrap();
        let lines: Vec<String> = missing.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "2000-01-05 missing 23 values",
                "2000-01-01 missing 4 values",
                "2000-01-04 missing 4 values",
                "2000-01-03 missing 1 values",
                "2000-01-02 missing 0 values",
            ]
        );
    }

    #[test]
    fn more_than_a_reading_per_hour_is_not_negative() {
        let crowded = [(0.0, Quality::Approved); 30];
        let store = build_store(&[&crowded[..]]);

        let missing = store
            .missing_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 01))
            .unwrap();
        assert_eq!(missing[0].missing, 0);
    }

    #[test]
    fn approval_rate() {
        use Quality::*;
        let store = build_store(&[
            &[(0.0, Approved), (0.0, Unapproved), (0.0, Unapproved)],
            &[(0.0, Unapproved), (0.0, Approved), (0.0, Unapproved)],
        ]);

        let rate = store
            .approved_percentage(date!(2000 - 01 - 01), date!(2000 - 01 - 02))
            .unwrap();
        assert_eq!(rate.percentage, 33.33);
        assert_eq!(
            rate.to_string(),
            "Approved values between 2000-01-01 and 2000-01-02: 33.33 %"
        );

        let rate = store
            .approved_percentage(date!(2000 - 01 - 01), date!(2000 - 01 - 01))
            .unwrap();
        assert_eq!(rate.percentage, 33.33);

        let none = build_store(&[&[(0.0, Unapproved)]]);
        let rate = none
            .approved_percentage(date!(2000 - 01 - 01), date!(2000 - 01 - 01))
            .unwrap();
        assert_eq!(rate.percentage, 0.0);
    }

    #[test]
    fn observation_time_does_not_matter() {
        let store = ObservationStore::from_sorted(vec![
            Observation::new(date!(2000 - 01 - 01), time!(23:00), 1.0, Quality::Approved),
            Observation::new(date!(2000 - 01 - 01), time!(0:00), 1.0, Quality::Unapproved),
        ])
        .unwrap();

        let rate = store
            .approved_percentage(date!(2000 - 01 - 01), date!(2000 - 01 - 01))
            .unwrap();
        assert_eq!(rate.percentage, 50.0);
    }

    #[test]
    fn repeated_queries_are_identical() {
        use Quality::*;
        let store = build_store(&[&[(1.3, Approved), (2.9, Unapproved)], &[(0.7, Approved)]]);
        let (from, to) = (date!(2000 - 01 - 01), date!(2000 - 01 - 02));

        assert_eq!(store.average_per_day(from, to), store.average_per_day(from, to));
        assert_eq!(store.missing_per_day(from, to), store.missing_per_day(from, to));
        assert_eq!(
            store.approved_percentage(from, to),
            store.approved_percentage(from, to)
        );
    }
}
