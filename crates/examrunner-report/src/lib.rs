//! Report rendering for examrunner results.

pub mod html;
