//! Infrastructure layer
//!
//! Clocks, in-process evidence storage and the model adapters.

pub mod clock;
pub mod evidence_store;
pub mod model;
