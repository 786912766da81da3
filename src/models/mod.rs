pub mod completion;
pub mod entry;
pub mod habit;
pub mod mood;
pub mod task;
pub mod tip;
pub mod user;
