#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure transformations over fetched health measure records.
//!
//! - [`merge`] coerces raw records and pairs each local measure with its
//!   nationwide baseline.
//! - [`view`] filters and sorts the merged dataset for the table.
//! - [`chart`] groups the dataset into per-measure time series.
//! - [`estimate`] scales prevalence to an estimated affected headcount.
//! - [`table`] combines the above into display rows.
//!
//! Nothing here mutates its input; every function returns a new view.

pub mod chart;
pub mod estimate;
pub mod merge;
pub mod segments;
pub mod table;
pub mod view;

pub use merge::{MalformedRecordError, MergeOutcome, MergeReport, RecordField};
