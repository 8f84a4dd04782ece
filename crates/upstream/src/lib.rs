pub mod client;
pub(crate) mod model;

pub use client::{HighriseClient, HighriseOptions};
