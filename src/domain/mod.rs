pub mod auth;
pub mod task;

#[cfg(test)]
pub mod test_util;
