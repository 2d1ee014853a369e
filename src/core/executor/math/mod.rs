// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arithmetic executors with numeric type promotion
//! (INT < LONG < FLOAT < DOUBLE).

use crate::core::event::complex_event::ComplexEvent;
use crate::core::event::value::AttributeValue;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Widest of two numeric types, or an error naming the operator when either
/// side is non-numeric.
fn promoted_type(left: Type, right: Type, op: MathOperator) -> Result<Type, String> {
    let (Some(l), Some(r)) = (left.numeric_rank(), right.numeric_rank()) else {
        return Err(format!(
            "{op:?} requires numeric operands, found {left:?} and {right:?}"
        ));
    };
    Ok(if l >= r { left } else { right })
}

#[derive(Debug)]
struct MathExpressionExecutor {
    left: Box<dyn ExpressionExecutor>,
    right: Box<dyn ExpressionExecutor>,
    operator: MathOperator,
    return_type: Type,
}

impl MathExpressionExecutor {
    fn new(
        left: Box<dyn ExpressionExecutor>,
        right: Box<dyn ExpressionExecutor>,
        operator: MathOperator,
    ) -> Result<Self, String> {
        let return_type = promoted_type(left.get_return_type(), right.get_return_type(), operator)?;
        Ok(Self {
            left,
            right,
            operator,
            return_type,
        })
    }

    fn apply_i64(&self, l: i64, r: i64) -> Option<i64> {
        match self.operator {
            MathOperator::Add => l.checked_add(r),
            MathOperator::Subtract => l.checked_sub(r),
            MathOperator::Multiply => l.checked_mul(r),
            MathOperator::Divide => l.checked_div(r),
        }
    }

    fn apply_f64(&self, l: f64, r: f64) -> f64 {
        match self.operator {
            MathOperator::Add => l + r,
            MathOperator::Subtract => l - r,
            MathOperator::Multiply => l * r,
            MathOperator::Divide => l / r,
        }
    }
}

fn as_i64(value: &AttributeValue) -> Option<i64> {
    match value {
        AttributeValue::Int(v) => Some(*v as i64),
        AttributeValue::Long(v) => Some(*v),
        _ => None,
    }
}

impl ExpressionExecutor for MathExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        let left = self.left.execute(event)?;
        let right = self.right.execute(event)?;
        match self.return_type {
            Type::INT => {
                let result = self.apply_i64(as_i64(&left)?, as_i64(&right)?)?;
                Some(AttributeValue::Int(result as i32))
            }
            Type::LONG => {
                let result = self.apply_i64(as_i64(&left)?, as_i64(&right)?)?;
                Some(AttributeValue::Long(result))
            }
            Type::FLOAT => {
                let result = self.apply_f64(left.as_f64()?, right.as_f64()?);
                Some(AttributeValue::Float(result as f32))
            }
            Type::DOUBLE => {
                let result = self.apply_f64(left.as_f64()?, right.as_f64()?);
                Some(AttributeValue::Double(result))
            }
            _ => None,
        }
    }

    fn get_return_type(&self) -> Type {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(Self {
            left: self.left.clone_executor(),
            right: self.right.clone_executor(),
            operator: self.operator,
            return_type: self.return_type,
        })
    }
}

macro_rules! math_executor {
    ($name:ident, $operator:expr) => {
        #[derive(Debug)]
        pub struct $name {
            inner: MathExpressionExecutor,
        }

        impl $name {
            pub fn new(
                left: Box<dyn ExpressionExecutor>,
                right: Box<dyn ExpressionExecutor>,
            ) -> Result<Self, String> {
                Ok(Self {
                    inner: MathExpressionExecutor::new(left, right, $operator)?,
                })
            }
        }

        impl ExpressionExecutor for $name {
            fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
                self.inner.execute(event)
            }

            fn get_return_type(&self) -> Type {
                self.inner.get_return_type()
            }

            fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
                Box::new(Self {
                    inner: MathExpressionExecutor {
                        left: self.inner.left.clone_executor(),
                        right: self.inner.right.clone_executor(),
                        operator: self.inner.operator,
                        return_type: self.inner.return_type,
                    },
                })
            }
        }
    };
}

math_executor!(AddExpressionExecutor, MathOperator::Add);
math_executor!(SubtractExpressionExecutor, MathOperator::Subtract);
math_executor!(MultiplyExpressionExecutor, MathOperator::Multiply);
math_executor!(DivideExpressionExecutor, MathOperator::Divide);
