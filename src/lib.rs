//! Background agent for the task manager web client that works out how long the user has
//! actually been active, keeps the seconds locally and reports them to the backend on a
//! schedule and whenever the page is hidden or closed.
//!

pub mod api;
pub mod cli;
pub mod context;
pub mod tracker;
pub mod utils;
