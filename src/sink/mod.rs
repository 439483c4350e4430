//! Delivery of the final onboarding payload

mod file;
mod traits;

pub use file::{JsonFileSink, StdoutSink};
pub use traits::PayloadSink;

#[cfg(test)]
pub use traits::MockPayloadSink;
