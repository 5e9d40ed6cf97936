//! Care loop around the generator.
//!
//! A `Bonsai` owns the genetic record and the vitals. Care actions mutate
//! the record (pruning count, wiring state, appended DNA segments); a timed
//! tick decays vitals and advances age. The generator only ever reads a
//! snapshot of the record.

pub mod vitals;
pub mod bonsai;
pub mod store;

pub use vitals::{CareConfig, Vitals, VITAL_MAX};
pub use bonsai::{Bonsai, CareError};
