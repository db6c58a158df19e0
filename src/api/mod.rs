pub mod client;
pub mod error;
pub mod http;

pub use client::{AnalysisApi, ApiClient, Timeouts};
pub use error::{ClientError, ClientResult};
