//! Shared setup for end-to-end tests of the site router.

pub mod fixtures;
pub mod setup;
