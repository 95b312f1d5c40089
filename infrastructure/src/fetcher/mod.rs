//! Image fetching adapters.

mod http;

pub use http::{DEFAULT_MAX_IMAGE_BYTES, HttpImageFetcher};
