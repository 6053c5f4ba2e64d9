pub mod health_checks;
pub mod news;
pub mod token;

pub use health_checks::*;
