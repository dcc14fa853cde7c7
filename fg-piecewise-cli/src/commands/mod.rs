pub mod align;
pub mod cases;
pub mod command;
pub mod report;
pub mod scoring;
