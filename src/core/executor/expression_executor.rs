// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::complex_event::ComplexEvent;
use crate::core::event::value::AttributeValue;
use crate::query_api::definition::Type;
use std::fmt::Debug;

/// A compiled expression node. Evaluation is deterministic, side-effect
/// free, and cheap relative to compilation; all type and position validation
/// happens when the tree is built.
pub trait ExpressionExecutor: Debug + Send + Sync {
    /// Evaluate against `event`. `None` signals an unresolvable value (null
    /// operand, missing stream position); conditions treat it as non-match.
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue>;

    fn get_return_type(&self) -> Type;

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor>;
}
