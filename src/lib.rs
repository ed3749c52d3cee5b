//! Dhaka Desk - a recent-news dashboard
//!
//! This crate serves a single page listing articles published in the last
//! 24 hours, filterable by category, read from an external `articles` table.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod format;
pub mod routes;
