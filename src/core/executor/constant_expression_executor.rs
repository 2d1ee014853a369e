// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::event::complex_event::ComplexEvent;
use crate::core::event::value::AttributeValue;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::Type;

#[derive(Clone, Debug)]
pub struct ConstantExpressionExecutor {
    value: AttributeValue,
    return_type: Type,
}

impl ConstantExpressionExecutor {
    pub fn new(value: AttributeValue, return_type: Type) -> Self {
        Self { value, return_type }
    }
}

impl ExpressionExecutor for ConstantExpressionExecutor {
    fn execute(&self, _event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        match &self.value {
            AttributeValue::Null => None,
            v => Some(v.clone()),
        }
    }

    fn get_return_type(&self) -> Type {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(self.clone())
    }
}
