mod news;
mod token;

pub use news::*;
pub use token::*;
