//! Bridge between the egui thread and the async portal controller.

pub mod commands;
pub mod runtime;
