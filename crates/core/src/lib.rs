#![forbid(unsafe_code)]

pub mod generators;
pub mod model;
pub mod pacing;
pub mod time;

pub use time::Clock;
