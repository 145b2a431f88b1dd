use std::{cmp::Ordering, collections::BTreeMap, ops::RangeInclusive};

use time::Date;

use crate::{
    error::{QueryError, StoreError},
    observation::Observation,
};

/// Immutable, date sorted sequence of observations.
///
/// Every query borrows the store, nothing mutates it once built. Reloading
/// means building a new store and replacing the old one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    // Non-decreasing by date, checked in `StoreBuilder::build`
    observations: Vec<Observation>,
}

/// Accumulates observations in input order, then hands out the store.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    observations: Vec<Observation>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            observations: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Checks the observations are sorted by date. They are never re-sorted:
    /// the order of the input is the order of the store.
    pub fn build(self) -> Result<ObservationStore, StoreError> {
        if let Some(index) = self
            .observations
            .windows(2)
            .position(|pair| pair[0].date > pair[1].date)
        {
            return Err(StoreError::Unsorted {
                index: index + 1,
                date: self.observations[index + 1].date,
                previous: self.observations[index].date,
            });
        }

        Ok(ObservationStore {
            observations: self.observations,
        })
    }
}

impl Extend<Observation> for StoreBuilder {
    fn extend<T: IntoIterator<Item = Observation>>(&mut self, iter: T) {
        self.observations.extend(iter);
    }
}

impl ObservationStore {
    pub fn from_sorted(observations: Vec<Observation>) -> Result<Self, StoreError> {
        StoreBuilder { observations }.build()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first_date(&self) -> Option<Date> {
        self.observations.first().map(|obs| obs.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.observations.last().map(|obs| obs.date)
    }

    /// Index of the first observation recorded on `date`.
    ///
    /// Binary search over the whole store. A match doesn't end the search: it
    /// is remembered and the search keeps going on the left half until the
    /// start of the run of `date` is reached.
    pub fn first_index_of(&self, date: Date) -> Option<usize> {
        let mut found = None;
        let (mut start, mut end) = (0, self.observations.len());

        while start < end {
            let middle = start + (end - start) / 2;
            match self.observations[middle].date.cmp(&date) {
                Ordering::Less => start = middle + 1,
                Ordering::Greater => end = middle,
                Ordering::Equal => {
                    found = Some(middle);
                    end = middle;
                }
            }
        }

        found
    }

    /// Index of the last observation recorded on `date`.
    ///
    /// Mirror of [`Self::first_index_of`], walking toward the end of the run.
    pub fn last_index_of(&self, date: Date) -> Option<usize> {
        let mut found = None;
        let (mut start, mut end) = (0, self.observations.len());

        while start < end {
            let middle = start + (end - start) / 2;
            match self.observations[middle].date.cmp(&date) {
                Ordering::Less => start = middle + 1,
                Ordering::Greater => end = middle,
                Ordering::Equal => {
                    found = Some(middle);
                    start = middle + 1;
                }
            }
        }

        found
    }

    /// Inclusive index range covering every observation from `from` to `to`.
    ///
    /// Both dates must be present in the store, a missing one is never
    /// replaced by its closest neighbour.
    pub fn index_range(&self, from: Date, to: Date) -> Result<RangeInclusive<usize>, QueryError> {
        if from > to {
            return Err(QueryError::InvertedRange { from, to });
        }

        let start = self
            .first_index_of(from)
            .ok_or(QueryError::DateNotFound(from))?;
        let end = self
            .last_index_of(to)
            .ok_or(QueryError::DateNotFound(to))?;

        Ok(start..=end)
    }

    /// Temperatures of the observations in `range`, bucketed by date.
    ///
    /// Buckets iterate by ascending date, and each keeps the store order of
    /// its readings.
    pub fn group_by_date(
        &self,
        range: RangeInclusive<usize>,
    ) -> Result<BTreeMap<Date, Vec<f32>>, QueryError> {
        let observations = self.slice(range)?;

        let mut days: BTreeMap<Date, Vec<f32>> = BTreeMap::new();
        for obs in observations {
            days.entry(obs.date).or_default().push(obs.temperature);
        }

        Ok(days)
    }

    /// Bound checked view of an inclusive index range.
    pub(crate) fn slice(&self, range: RangeInclusive<usize>) -> Result<&[Observation], QueryError> {
        let (start, end) = range.into_inner();
        let len = self.observations.len();
        if start > end || end >= len {
            return Err(QueryError::IndexOutOfRange { start, end, len });
        }
        Ok(&self.observations[start..=end])
    }
}
