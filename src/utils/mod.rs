mod datetime;
mod path;

pub use datetime::*;
pub use path::*;
