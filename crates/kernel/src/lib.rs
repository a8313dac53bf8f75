//! Settings, module contract and lifecycle registry shared by every catalog crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, Schema};
pub use registry::ModuleRegistry;
pub use settings::Settings;
