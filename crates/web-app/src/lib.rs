#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod app;
pub mod chart;
pub mod log;
mod settings;
pub mod sync;

pub use app::*;
pub use settings::*;
