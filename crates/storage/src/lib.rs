#![forbid(unsafe_code)]

pub mod github;
pub mod json_file;
pub mod repository;

pub use github::{GitHubConfig, GitHubStore};
pub use json_file::JsonFileStore;
pub use repository::{InMemoryStore, QuestionStore, Storage, StorageError};
