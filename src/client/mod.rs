//! Headless client for the feedback API.
//!
//! [`ApiClient`] speaks HTTP; [`FeedController`] keeps the list, pagination
//! and form state a feedback view renders from.

mod api;
mod controller;

pub use api::*;
pub use controller::*;
