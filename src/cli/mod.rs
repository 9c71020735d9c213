pub mod display;
pub mod once;
pub mod setup;
pub mod ui;
pub mod watch;
