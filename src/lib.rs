//! Matches a training-course feed against a badge catalog by name.
//!
//! The pipeline downloads the course feed, fetches badges from the badge
//! service (or reads them from disk), validates both documents and maps every
//! course to the badges whose name it contains.

pub mod badge_client;
pub mod config;
pub mod diagnostics;
pub mod fetcher;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod storage;
pub mod store;
pub mod validate;
