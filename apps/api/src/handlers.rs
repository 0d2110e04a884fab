pub mod audit;
pub mod health;
pub mod me;
pub mod rbac;
pub mod users;

#[cfg(test)]
mod test_support;
