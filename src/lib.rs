pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod pipeline;
pub mod state;
pub mod ui;
