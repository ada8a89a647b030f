//! ACC domain logic
//!
//! The turn pipeline (recall, qualification, compression, policy, control
//! loop), the CCS schema, evaluation and chat sessions.

pub mod compressor;
pub mod control_loop;
pub mod live_evaluation;
pub mod metrics;
pub mod policy;
pub mod qualification;
pub mod recall;
pub mod schema;
pub mod session;
pub mod text;
