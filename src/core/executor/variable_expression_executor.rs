// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::complex_event::ComplexEvent;
use crate::core::event::state::state_event::StateEvent;
use crate::core::event::stream::stream_event::StreamEvent;
use crate::core::event::value::AttributeValue;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::Type;

/// Resolved location of an attribute: which stream event inside a
/// `StateEvent`, and which attribute index within it. Fixed at compile time
/// so the event path does no name resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariablePosition {
    pub event_index: usize,
    pub attribute_index: usize,
}

#[derive(Clone, Debug)]
pub struct VariableExpressionExecutor {
    position: VariablePosition,
    return_type: Type,
    attribute_name: String,
}

impl VariableExpressionExecutor {
    pub fn new(position: VariablePosition, return_type: Type, attribute_name: String) -> Self {
        Self {
            position,
            return_type,
            attribute_name,
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    fn read(&self, data: &[AttributeValue]) -> Option<AttributeValue> {
        match data.get(self.position.attribute_index) {
            Some(AttributeValue::Null) | None => None,
            Some(v) => Some(v.clone()),
        }
    }
}

impl ExpressionExecutor for VariableExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        let event = event?;
        if let Some(state) = event.as_any().downcast_ref::<StateEvent>() {
            let stream_event = state.stream_event(self.position.event_index)?;
            self.read(&stream_event.before_window_data)
        } else if let Some(stream) = event.as_any().downcast_ref::<StreamEvent>() {
            // Bare stream events only carry position 0.
            if self.position.event_index != 0 {
                return None;
            }
            self.read(&stream.before_window_data)
        } else {
            None
        }
    }

    fn get_return_type(&self) -> Type {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(self.clone())
    }
}
