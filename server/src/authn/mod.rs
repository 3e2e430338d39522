//! Session authentication

pub mod session;
