pub mod signup;
pub mod user;
