//! Normalizes RSS 2.0, RDF/RSS 1.0 and Atom feeds into JSON Feed records.
//!
//! - [`feed`] - the normalization engine
//! - [`build`] - the parse stage of a feed build: reads configured sources,
//!   normalizes them concurrently and isolates per-source failures
//! - [`config`] - `feedloom.toml` loading

pub mod build;
pub mod config;
pub mod feed;
