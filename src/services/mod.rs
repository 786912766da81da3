pub mod csv_export;
pub mod grid;
pub mod report;
pub mod rotation;
pub mod streak;
pub mod tip_tag;
