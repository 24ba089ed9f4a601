pub mod artifacts;
pub mod error;
pub mod storage;
pub mod utils;
