//! Attendance ledger and payroll engine for hourly staff.
//!
//! This crate records one shift per worker per calendar day, closes open
//! shifts when the worker clocks out, sends a best-effort notification after
//! every write, and derives monthly payroll from the recorded shifts.

#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod store;
