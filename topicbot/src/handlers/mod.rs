//! App-level handlers placed in front of the upload workflow.

mod logging;

pub use logging::LoggingHandler;
