// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::complex_event::{ComplexEvent, ComplexEventChunk, LinkedEvent};
use crate::core::event::value::AttributeValue;
use std::any::Any;

/// A plain row-shaped event: the unit of insertion into a table and the
/// shape in which `find` returns matched rows.
///
/// `before_window_data` carries the attribute values as defined by the
/// stream or table schema; `output_data` is populated by upstream projection
/// when the row to store differs from the raw input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamEvent {
    pub timestamp: i64,
    pub before_window_data: Vec<AttributeValue>,
    pub output_data: Option<Vec<AttributeValue>>,
    pub next: Option<Box<StreamEvent>>,
}

impl StreamEvent {
    pub fn new(timestamp: i64, attribute_count: usize) -> Self {
        Self {
            timestamp,
            before_window_data: vec![AttributeValue::Null; attribute_count],
            output_data: None,
            next: None,
        }
    }

    /// Row values this event contributes to a table: the projected output
    /// when present, the raw attribute data otherwise.
    pub fn row_values(&self) -> &[AttributeValue] {
        match &self.output_data {
            Some(output) => output,
            None => &self.before_window_data,
        }
    }
}

impl ComplexEvent for StreamEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl LinkedEvent for StreamEvent {
    fn next(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    fn next_slot_mut(&mut self) -> &mut Option<Box<Self>> {
        &mut self.next
    }
}

/// Batch of rows to insert, as handed to `Table::add_events`.
pub type StreamEventChunk = ComplexEventChunk<StreamEvent>;
