mod conversions;
mod types;

pub use types::{CreateResourceRequest, ResourceResponse, UpdateResourceRequest};
