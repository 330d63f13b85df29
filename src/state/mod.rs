//! State module for classifying how each request ended
//!
//! # Components
//!
//! - `RequestOutcome`: terminal classification of a request (processed, stored,
//!   dropped as duplicate or offsite, or one of the failure kinds)

mod outcome;

pub use outcome::RequestOutcome;
