//! Resource client for the task tracker service: a reqwest-backed transport
//! behind a stubbable trait, the REST client, and the file-backed session
//! store.

mod client;
mod session_file;
mod transport;

pub use client::TaskTrackerClient;
pub use session_file::FileSessionStore;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, ReqwestHttpTransport};
