pub mod export;
pub mod fetch;
pub mod notify;
pub mod verdict;
pub mod vision;
