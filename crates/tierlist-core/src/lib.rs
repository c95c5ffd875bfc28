//! Core types and trait definitions for the subject tier-list.
//!
//! This crate is free of HTTP and database dependencies. All other crates
//! depend on it: the review codec, merge and aggregation engines, and the
//! reaction dispatcher live here as plain functions over these types.

// Native `async fn` in traits; `Send` bounds are spelled out on the store
// trait where the router needs them.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod aggregate;
pub mod cards;
pub mod config;
pub mod dispatch;
pub mod embed;
pub mod error;
pub mod merge;
pub mod render;
pub mod review;
pub mod store;
pub mod subject;
pub mod tierboard;

pub use error::{Error, Result};
