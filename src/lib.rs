// src/lib.rs

//! Counselling announcement tracker.
//!
//! Scrapes counselling websites, classifies announcements by round and
//! document type, and fetches only what changed since the last pass.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
