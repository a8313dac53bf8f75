//! Catalog service library
//!
//! Modules for books, authors and reviews plus the startup wiring that
//! connects them to their stores.

pub mod app;
pub mod modules;
pub mod utils;
