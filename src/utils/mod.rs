pub mod error;
pub mod time;

pub use error::*;
pub use time::*;
