//! Range queries over hourly weather observations.
//!
//! Observations are loaded once, sorted by date, into an [`ObservationStore`].
//! The store then answers, for any inclusive date range present in the data,
//! the average temperature of each day, the number of hourly readings missing
//! each day, and the share of approved readings.
//!
//! ```no_run
//! use time::macros::date;
//! use weatherdata::ObservationStore;
//!
//! let store = ObservationStore::load("smhi-visby.csv")?;
//! for day in store.average_per_day(date!(2000 - 01 - 01), date!(2000 - 01 - 31))? {
//!     println!("{day}");
//! }
//! # Ok::<(), miette::Report>(())
//! ```

mod error;
mod loader;
mod observation;
mod query;
mod store;

pub use error::{QueryError, StoreError};
pub use loader::{LineError, LoadError};
pub use observation::{Observation, Quality, APPROVED_CODE};
pub use query::{
    round_half_up, ApprovalRate, DailyAverage, MissingValues, EXPECTED_READINGS_PER_DAY,
};
pub use store::{ObservationStore, StoreBuilder};
