//! examrunner-core: Exam session state machine, question loading, and scoring.
//!
//! This crate defines the question data model, the loader that validates a
//! question bank, the session controller that drives an exam from intro to
//! result, and the pure results calculator.

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod statistics;
pub mod traits;
