pub mod client;

pub use client::{Ack, ApiClient, BatchOutcome, Transport, TransportError};
