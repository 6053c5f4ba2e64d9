pub mod latest;
pub mod token;

pub use token::{AuthError, Claims, IssuedToken, TokenService};
