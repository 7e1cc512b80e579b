//! cscope-db - Registry of cscope index databases
//!
//! Every project binds a source tree to the directory holding its generated
//! index and to the generator script that produced it. The registry answers
//! "which project am I in?" by longest root prefix, refuses to let two
//! projects share an output directory, and rewrites its JSON document
//! atomically so an interrupted command never leaves it half written.
//!
//! Generators are opaque executables called as `<generator> <root> <output>`.
//! A small runner script inside each output directory remembers that call.

pub mod atomic;
pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod paths;
pub mod record;
pub mod registry;
pub mod runner;

pub use catalog::GeneratorCatalog;
pub use config::{Config, FailurePolicy};
pub use error::ProjectError;
pub use manager::{InitRequest, Listing, ProjectManager};
pub use paths::Paths;
pub use record::ProjectRecord;
pub use registry::Registry;
pub use runner::{Executor, SystemExecutor};
