pub mod env;
pub mod setup;
