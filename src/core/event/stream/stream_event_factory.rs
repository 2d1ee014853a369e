// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::stream::stream_event::StreamEvent;

/// Creates stream events of a fixed arity, standing in for the engine's
/// event pool. Backends receive one at `init` sized to the table schema.
#[derive(Clone, Debug)]
pub struct StreamEventFactory {
    attribute_count: usize,
}

impl StreamEventFactory {
    pub fn new(attribute_count: usize) -> Self {
        Self { attribute_count }
    }

    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    pub fn new_instance(&self) -> StreamEvent {
        StreamEvent::new(0, self.attribute_count)
    }
}

/// Copies stream events without carrying their chain links, so a stored row
/// can be handed out as a fresh single event.
#[derive(Clone, Debug)]
pub struct StreamEventCloner {
    factory: StreamEventFactory,
}

impl StreamEventCloner {
    pub fn new(factory: StreamEventFactory) -> Self {
        Self { factory }
    }

    pub fn copy_stream_event(&self, event: &StreamEvent) -> StreamEvent {
        let mut copy = self.factory.new_instance();
        copy.timestamp = event.timestamp;
        for (i, value) in event.before_window_data.iter().enumerate() {
            if i < copy.before_window_data.len() {
                copy.before_window_data[i] = value.clone();
            }
        }
        copy.output_data = event.output_data.clone();
        copy
    }
}
