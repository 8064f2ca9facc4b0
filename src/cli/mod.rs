pub mod returns;
pub mod ui;
