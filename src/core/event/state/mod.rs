// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod state_event;

pub use state_event::{StateEvent, StateEventChunk};
