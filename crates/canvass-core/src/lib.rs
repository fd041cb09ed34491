//! Core types and trait definitions for the canvassing progress engine.
//!
//! This crate holds the domain model, the canvassing session, the
//! interaction recorder, coverage aggregation and map markers. It has no
//! HTTP or database dependencies; backends implement [`store::CanvassStore`].

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod demo;
pub mod error;
pub mod interaction;
pub mod marker;
pub mod precinct;
pub mod recorder;
pub mod session;
pub mod stats;
pub mod store;
pub mod volunteer;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, Result};
