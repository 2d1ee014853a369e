// SPDX-License-Identifier: MIT OR Apache-2.0

use std::any::Any;
use std::fmt::Debug;

/// Common surface of every event flowing through the engine. Expression
/// executors receive events through this trait and downcast to the concrete
/// shape they were compiled against.
pub trait ComplexEvent: Debug + Send + Sync {
    fn timestamp(&self) -> i64;
    fn as_any(&self) -> &dyn Any;
}

/// An event that links forward to the next event of the same shape.
/// Implemented by `StreamEvent` and `StateEvent`; lets [`ComplexEventChunk`]
/// hold a batch as a singly linked chain the way the engine hands them off.
pub trait LinkedEvent: Debug + Send + Sync {
    fn next(&self) -> Option<&Self>;
    fn next_slot_mut(&mut self) -> &mut Option<Box<Self>>;

    fn set_next(&mut self, next: Option<Box<Self>>)
    where
        Self: Sized,
    {
        *self.next_slot_mut() = next;
    }
}

/// A finite, forward-iterable batch of events passed to a table CRUD call.
///
/// Iteration does not consume the chunk, so the operation facade can
/// re-present the same batch on its single synchronous retry after a
/// detected disconnection.
#[derive(Debug, Default)]
pub struct ComplexEventChunk<E: LinkedEvent> {
    first: Option<Box<E>>,
}

impl<E: LinkedEvent> ComplexEventChunk<E> {
    pub fn new() -> Self {
        Self { first: None }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn first(&self) -> Option<&E> {
        self.first.as_deref()
    }

    /// Take the head of the chain, leaving the chunk empty.
    pub fn take_first(&mut self) -> Option<Box<E>> {
        self.first.take()
    }

    /// Append an event at the tail of the chain.
    pub fn add(&mut self, mut event: Box<E>) {
        *event.next_slot_mut() = None;
        append(&mut self.first, event);
    }

    pub fn iter(&self) -> ChunkIter<'_, E> {
        ChunkIter {
            current: self.first.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

// Chunks are short-lived batches; recursing to the tail keeps the append
// safe without a raw tail pointer.
fn append<E: LinkedEvent>(slot: &mut Option<Box<E>>, event: Box<E>) {
    match slot {
        None => *slot = Some(event),
        Some(current) => append(current.next_slot_mut(), event),
    }
}

pub struct ChunkIter<'a, E: LinkedEvent> {
    current: Option<&'a E>,
}

impl<'a, E: LinkedEvent> Iterator for ChunkIter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.current?;
        self.current = event.next();
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::stream::stream_event::StreamEvent;
    use crate::core::event::value::AttributeValue;

    fn event(tag: i32) -> Box<StreamEvent> {
        let mut e = StreamEvent::new(0, 1);
        e.before_window_data[0] = AttributeValue::Int(tag);
        Box::new(e)
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut chunk = ComplexEventChunk::new();
        assert!(chunk.is_empty());
        chunk.add(event(1));
        chunk.add(event(2));
        chunk.add(event(3));
        let tags: Vec<_> = chunk
            .iter()
            .map(|e| e.before_window_data[0].clone())
            .collect();
        assert_eq!(
            tags,
            vec![
                AttributeValue::Int(1),
                AttributeValue::Int(2),
                AttributeValue::Int(3)
            ]
        );
        assert_eq!(chunk.len(), 3);
    }

    #[test]
    fn iteration_does_not_consume() {
        let mut chunk = ComplexEventChunk::new();
        chunk.add(event(7));
        assert_eq!(chunk.iter().count(), 1);
        assert_eq!(chunk.iter().count(), 1);
    }
}
