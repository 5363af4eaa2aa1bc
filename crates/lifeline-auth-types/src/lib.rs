//! Session types shared by Lifeline services.
//!
//! Provides access-token validation, session cookie builders, and the `Session` extractor.

pub mod cookie;
pub mod session;
pub mod token;
