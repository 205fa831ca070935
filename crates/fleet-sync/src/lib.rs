pub mod backend;
pub mod engine;
pub mod executor;
pub mod git_ops;
pub mod inspect;

pub use backend::{GitBackend, GitCli};
pub use executor::sync_repository;
pub use inspect::inspect;
