// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event model: runtime values, row-shaped stream events, correlated state
//! events, and the linked chunks in which they travel through the engine.

pub mod complex_event;
pub mod state;
pub mod stream;
pub mod value;

pub use complex_event::{ComplexEvent, ComplexEventChunk, LinkedEvent};
pub use value::AttributeValue;
