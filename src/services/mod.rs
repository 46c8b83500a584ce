//! Collaborators with side effects: local persistence and the remote
//! search backend.

pub mod recent;
pub mod remote;
pub mod storage;

pub use recent::RecentSearches;
pub use remote::{HttpSearchClient, RemoteSearch};
pub use storage::LocalStorage;
