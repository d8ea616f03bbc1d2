//! Lifecycle of component custom resources

mod client;
mod phase;

pub use client::LifecycleClient;
pub use phase::{Phase, Transition};
