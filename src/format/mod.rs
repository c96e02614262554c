mod erasure;
mod meta;

pub use erasure::*;
pub use meta::*;
