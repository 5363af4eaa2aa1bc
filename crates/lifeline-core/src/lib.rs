//! Service plumbing shared by Lifeline binaries: env config, health probes,
//! request-id middleware, timestamp serialization, and tracing setup.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
