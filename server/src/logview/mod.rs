//! Log normalization and formatting

pub mod format;
