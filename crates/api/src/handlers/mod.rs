pub mod health;
pub mod summaries;
