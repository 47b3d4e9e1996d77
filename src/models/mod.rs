pub mod event;
pub mod export;
pub mod notification;
pub mod verdict;
