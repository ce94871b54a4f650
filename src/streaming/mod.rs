// src/streaming/mod.rs
pub mod channel;
pub mod heartbeat;

pub use channel::EventSink;
pub use heartbeat::Heartbeat;
