pub mod auth;
pub mod github;
pub mod health;
pub mod test_cases;
