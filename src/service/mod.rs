//! Command processing service

mod context;
mod processor;
mod runner;

pub use context::RequestContext;
pub use processor::{CommandProcessor, MSG_SUBSCRIPTION_EXISTS, MSG_SUBSCRIPTION_MISSING};
pub use runner::{CommandLoop, RunSummary};
