//! Lifecycle management for the simulator binary.
//!
//! # Data Flow
//! ```text
//! Ctrl-C → interrupted() resolves → simulation::run stops issuing calls
//!        → report printed → exit
//! ```

pub mod signals;
