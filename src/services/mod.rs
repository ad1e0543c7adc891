pub mod auth;
pub mod catalog;
pub mod forms;
pub mod profiles;
pub mod providers;

pub use providers::{MetadataError, MetadataProvider, OmdbProvider};
