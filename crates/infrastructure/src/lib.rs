pub mod cache;
pub mod database;
pub mod guardian;

pub use cache::*;
pub use database::*;
pub use guardian::GuardianSource;
