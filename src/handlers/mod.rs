pub mod auth;
pub mod completions;
pub mod entries;
pub mod habits;
pub mod health;
pub mod journal;
pub mod moods;
pub mod reports;
pub mod tasks;
pub mod tips;
