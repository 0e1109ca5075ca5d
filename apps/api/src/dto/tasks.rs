mod conversions;
mod types;

pub use types::{
    CreateTaskRequest, TaskListQuery, TaskMutationResponse, TaskResponse, UpdateTaskRequest,
};
