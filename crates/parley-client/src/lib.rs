pub mod error;
pub mod http;
pub mod traits;

pub use error::{ClientError, Result};
pub use http::{HttpBackend, HttpBackendBuilder, DEFAULT_BASE_URL};
pub use traits::ChatBackend;
