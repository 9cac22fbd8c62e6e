//! Data models for the feedback guestbook.
//!
//! Field names on the wire are camelCase and match the front-end contract.

mod feedback;

pub use feedback::*;
