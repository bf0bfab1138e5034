//! Job board core: the record store, the query/mutation services built on top of it, and a
//! thin JSON adapter exposing them over HTTP.

pub mod board;
pub mod config;
pub mod error;
pub mod telemetry;
