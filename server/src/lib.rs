//! Adventus Dashboard Server Library
//!
//! Core modules for the adventus dashboard backend: an authenticated
//! log viewer proxying the Vercel deployment API.

pub mod app;
pub mod authn;
pub mod errors;
pub mod logs;
pub mod logview;
pub mod models;
pub mod server;
pub mod utils;
pub mod vercel;
