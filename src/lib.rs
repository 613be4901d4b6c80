pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod egui_integration;
pub mod host;
pub mod job;
pub mod overlay;
pub mod property;
pub mod ui;
