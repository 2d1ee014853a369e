// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod stream_event;
pub mod stream_event_factory;

pub use stream_event::{StreamEvent, StreamEventChunk};
pub use stream_event_factory::{StreamEventCloner, StreamEventFactory};
