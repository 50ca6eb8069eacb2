pub mod http;
pub mod traits;

pub use http::{HttpFetcher, validate_url};
pub use traits::{FetchRequest, ResourceFetcher};
