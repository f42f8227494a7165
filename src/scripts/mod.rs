//! Built-in scripts — catalog plus the keyword matcher that selects them.

pub mod catalog;
pub mod matcher;

pub use catalog::{BuiltinScript, QuickAction, UnknownBuiltin, CATALOG_ONLY, QUICK_ACTIONS};
pub use matcher::match_instruction;
