// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::complex_event::{ComplexEvent, ComplexEventChunk, LinkedEvent};
use crate::core::event::stream::stream_event::StreamEvent;
use std::any::Any;

/// An event carrying correlated stream events from joined sources, indexed
/// by their position in the execution plan. Table matching injects the
/// candidate table row at the compiled store position before evaluating a
/// condition, so one executor tree serves both sides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateEvent {
    pub timestamp: i64,
    pub stream_events: Vec<Option<StreamEvent>>,
    pub next: Option<Box<StateEvent>>,
}

impl StateEvent {
    pub fn new(timestamp: i64, stream_event_count: usize) -> Self {
        Self {
            timestamp,
            stream_events: vec![None; stream_event_count],
            next: None,
        }
    }

    pub fn stream_event(&self, position: usize) -> Option<&StreamEvent> {
        self.stream_events.get(position)?.as_ref()
    }

    pub fn set_stream_event(&mut self, position: usize, event: Option<StreamEvent>) {
        if position >= self.stream_events.len() {
            self.stream_events.resize(position + 1, None);
        }
        self.stream_events[position] = event;
    }
}

impl ComplexEvent for StateEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl LinkedEvent for StateEvent {
    fn next(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    fn next_slot_mut(&mut self) -> &mut Option<Box<Self>> {
        &mut self.next
    }
}

/// Batch of correlated events driving `delete`, `update` and
/// `update_or_add` calls.
pub type StateEventChunk = ComplexEventChunk<StateEvent>;
