use miette::Diagnostic;
use thiserror::Error;
use time::Date;

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum QueryError {
    #[error("No observation recorded on {0}")]
    #[diagnostic(
        code(weatherdata::query::date_not_found),
        help("both ends of the range must be dates present in the loaded data")
    )]
    DateNotFound(Date),

    #[error("Invalid range: {from} is after {to}")]
    #[diagnostic(code(weatherdata::query::inverted_range))]
    InvertedRange { from: Date, to: Date },

    #[error("Index range {start}..={end} is out of bounds for {len} observations")]
    #[diagnostic(code(weatherdata::query::index_out_of_range))]
    IndexOutOfRange { start: usize, end: usize, len: usize },

    #[error("No observations between {from} and {to}")]
    #[diagnostic(code(weatherdata::query::no_observations))]
    NoObservations { from: Date, to: Date },
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum StoreError {
    #[error("Observations are not sorted by date: entry {index} ({date}) comes after {previous}")]
    #[diagnostic(code(weatherdata::store::unsorted))]
    Unsorted {
        index: usize,
        date: Date,
        previous: Date,
    },
}
