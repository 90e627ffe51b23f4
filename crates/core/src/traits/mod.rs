pub mod repository;
pub mod source;

pub use repository::*;
pub use source::*;
