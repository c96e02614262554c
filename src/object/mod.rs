mod api_datatypes;
mod api_errors;
mod api_trait;

pub use api_datatypes::*;
pub use api_errors::*;
pub use api_trait::*;
