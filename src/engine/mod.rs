//! Refinement engine - the iteration state machine and its reports.
//!
//! This module provides:
//! - RunState and per-iteration records
//! - The RefineEngine loop controller (direct and refinement paths)
//! - The comparison synthesizer

pub mod compare;
pub mod refine;
pub mod state;

pub use refine::{DirectReport, RefineEngine, RefinementReport};
pub use state::{IterationRecord, RunState};
