//! Excel domain — everything that talks to Microsoft Excel via AppleScript.
//!
//! External code should go through the runner trait and the functions
//! re-exported here.

pub mod context;
pub mod errors;
pub mod executor;
pub mod reader;
pub mod runner;

pub use context::{is_running, read_context, ContextSnapshot};
pub use errors::Permission;
pub use executor::ScriptExecutor;
pub use reader::read_selection;
pub use runner::{Osascript, ScriptFailure, ScriptRunner};
