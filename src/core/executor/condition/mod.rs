// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boolean condition executors: comparison, conjunction, disjunction,
//! negation. Operand types are validated at construction; a failed
//! construction surfaces as a compile-time error.

use crate::core::event::complex_event::ComplexEvent;
use crate::core::event::value::AttributeValue;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::Type;
use crate::query_api::expression::CompareOperator;
use std::cmp::Ordering;

/// Cross-type comparison: numerics compare numerically, strings and bools
/// compare within their own type. `None` for incomparable pairs.
fn compare_values(left: &AttributeValue, right: &AttributeValue) -> Option<Ordering> {
    match (left, right) {
        (AttributeValue::String(l), AttributeValue::String(r)) => Some(l.cmp(r)),
        (AttributeValue::Bool(l), AttributeValue::Bool(r)) => Some(l.cmp(r)),
        _ => {
            let l = left.as_f64()?;
            let r = right.as_f64()?;
            l.partial_cmp(&r)
        }
    }
}

fn comparable(left: Type, right: Type) -> bool {
    left == right || (left.is_numeric() && right.is_numeric())
}

#[derive(Debug)]
pub struct CompareExpressionExecutor {
    left: Box<dyn ExpressionExecutor>,
    right: Box<dyn ExpressionExecutor>,
    operator: CompareOperator,
}

impl CompareExpressionExecutor {
    pub fn new(
        left: Box<dyn ExpressionExecutor>,
        right: Box<dyn ExpressionExecutor>,
        operator: CompareOperator,
    ) -> Result<Self, String> {
        let (lt, rt) = (left.get_return_type(), right.get_return_type());
        if !comparable(lt, rt) {
            return Err(format!(
                "Cannot compare {lt:?} with {rt:?} using {operator:?}"
            ));
        }
        Ok(Self {
            left,
            right,
            operator,
        })
    }
}

impl ExpressionExecutor for CompareExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        let left = self.left.execute(event)?;
        let right = self.right.execute(event)?;
        let ordering = compare_values(&left, &right)?;
        let result = match self.operator {
            CompareOperator::Equal => ordering == Ordering::Equal,
            CompareOperator::NotEqual => ordering != Ordering::Equal,
            CompareOperator::GreaterThan => ordering == Ordering::Greater,
            CompareOperator::GreaterThanEqual => ordering != Ordering::Less,
            CompareOperator::LessThan => ordering == Ordering::Less,
            CompareOperator::LessThanEqual => ordering != Ordering::Greater,
        };
        Some(AttributeValue::Bool(result))
    }

    fn get_return_type(&self) -> Type {
        Type::BOOL
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(Self {
            left: self.left.clone_executor(),
            right: self.right.clone_executor(),
            operator: self.operator,
        })
    }
}

fn require_bool(side: &str, executor: &dyn ExpressionExecutor, op: &str) -> Result<(), String> {
    let t = executor.get_return_type();
    if t != Type::BOOL {
        return Err(format!("{side} operand of {op} must be BOOL, found {t:?}"));
    }
    Ok(())
}

#[derive(Debug)]
pub struct AndExpressionExecutor {
    left: Box<dyn ExpressionExecutor>,
    right: Box<dyn ExpressionExecutor>,
}

impl AndExpressionExecutor {
    pub fn new(
        left: Box<dyn ExpressionExecutor>,
        right: Box<dyn ExpressionExecutor>,
    ) -> Result<Self, String> {
        require_bool("Left", left.as_ref(), "AND")?;
        require_bool("Right", right.as_ref(), "AND")?;
        Ok(Self { left, right })
    }
}

impl ExpressionExecutor for AndExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        let AttributeValue::Bool(l) = self.left.execute(event)? else {
            return None;
        };
        if !l {
            return Some(AttributeValue::Bool(false));
        }
        let AttributeValue::Bool(r) = self.right.execute(event)? else {
            return None;
        };
        Some(AttributeValue::Bool(r))
    }

    fn get_return_type(&self) -> Type {
        Type::BOOL
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(Self {
            left: self.left.clone_executor(),
            right: self.right.clone_executor(),
        })
    }
}

#[derive(Debug)]
pub struct OrExpressionExecutor {
    left: Box<dyn ExpressionExecutor>,
    right: Box<dyn ExpressionExecutor>,
}

impl OrExpressionExecutor {
    pub fn new(
        left: Box<dyn ExpressionExecutor>,
        right: Box<dyn ExpressionExecutor>,
    ) -> Result<Self, String> {
        require_bool("Left", left.as_ref(), "OR")?;
        require_bool("Right", right.as_ref(), "OR")?;
        Ok(Self { left, right })
    }
}

impl ExpressionExecutor for OrExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        let AttributeValue::Bool(l) = self.left.execute(event)? else {
            return None;
        };
        if l {
            return Some(AttributeValue::Bool(true));
        }
        let AttributeValue::Bool(r) = self.right.execute(event)? else {
            return None;
        };
        Some(AttributeValue::Bool(r))
    }

    fn get_return_type(&self) -> Type {
        Type::BOOL
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(Self {
            left: self.left.clone_executor(),
            right: self.right.clone_executor(),
        })
    }
}

#[derive(Debug)]
pub struct NotExpressionExecutor {
    inner: Box<dyn ExpressionExecutor>,
}

impl NotExpressionExecutor {
    pub fn new(inner: Box<dyn ExpressionExecutor>) -> Result<Self, String> {
        require_bool("Single", inner.as_ref(), "NOT")?;
        Ok(Self { inner })
    }
}

impl ExpressionExecutor for NotExpressionExecutor {
    fn execute(&self, event: Option<&dyn ComplexEvent>) -> Option<AttributeValue> {
        match self.inner.execute(event)? {
            AttributeValue::Bool(v) => Some(AttributeValue::Bool(!v)),
            _ => None,
        }
    }

    fn get_return_type(&self) -> Type {
        Type::BOOL
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(Self {
            inner: self.inner.clone_executor(),
        })
    }
}
