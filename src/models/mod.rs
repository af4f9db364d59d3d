pub mod discovery;
pub mod restaurant;
