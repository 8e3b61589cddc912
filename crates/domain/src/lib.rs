#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod execution;
mod exercise;
mod name;
mod service;
mod statistics;
mod store;
mod subscription;
mod training;
mod workout;
mod workout_session;

pub use error::*;
pub use execution::*;
pub use exercise::*;
pub use name::*;
pub use service::*;
pub use statistics::*;
pub use store::*;
pub use subscription::*;
pub use training::*;
pub use workout::*;
pub use workout_session::*;
