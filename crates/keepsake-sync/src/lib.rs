pub mod connectivity;
pub mod engine;
pub mod error;
pub mod http;
pub mod remote;
pub mod service;

pub use connectivity::{AssumeOnline, Connectivity};
pub use engine::{SyncEngine, SyncOutcome, SyncReport};
pub use error::SyncError;
pub use http::HttpRemoteSource;
pub use remote::{RecordKind, RemoteSource};
pub use service::{SyncEvent, SyncHandle, SyncService};
