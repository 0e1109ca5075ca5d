mod conversions;
mod types;

pub use types::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};
