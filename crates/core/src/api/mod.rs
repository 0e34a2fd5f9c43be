//! Backend access: transport seam, typed client and error normalisation.

mod client;
mod error;
/// Scripted in-memory transport for tests.
pub mod testing;
mod transport;

pub use client::{paths, ApiClient, AuthSession};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
