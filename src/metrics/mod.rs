pub mod collector;
pub mod snapshot;
