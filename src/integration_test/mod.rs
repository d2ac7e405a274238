mod auth_api;
mod task_api;
pub mod test_util;
