// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiles `query_api` expressions into executor trees against the schemas
//! of a matching event and a table. All name resolution, ambiguity checks
//! and operand type validation happen here, once, at query-compile time.

use crate::core::event::value::AttributeValue;
use crate::core::executor::condition::{
    AndExpressionExecutor, CompareExpressionExecutor, NotExpressionExecutor, OrExpressionExecutor,
};
use crate::core::executor::math::{
    AddExpressionExecutor, DivideExpressionExecutor, MultiplyExpressionExecutor,
    SubtractExpressionExecutor,
};
use crate::core::executor::{
    ConstantExpressionExecutor, ExpressionExecutor, VariableExpressionExecutor, VariablePosition,
};
use crate::core::table::MatchingMetaInfo;
use crate::query_api::definition::Type;
use crate::query_api::expression::{ConstantValue, Expression, Variable};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionParseError {
    pub message: String,
    pub query_name: String,
}

impl ExpressionParseError {
    pub fn new(message: impl Into<String>, query_name: &str) -> Self {
        Self {
            message: message.into(),
            query_name: query_name.to_string(),
        }
    }
}

impl fmt::Display for ExpressionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in query '{}'", self.message, self.query_name)
    }
}

impl std::error::Error for ExpressionParseError {}

pub type ExpressionParseResult<T> = Result<T, ExpressionParseError>;

/// Context for [`parse_expression`]: the schemas and state-event positions a
/// variable may resolve against, plus the owning query name for diagnostics.
pub struct ExpressionParserContext<'a> {
    pub matching_meta: &'a MatchingMetaInfo,
    pub query_name: &'a str,
}

pub fn parse_expression(
    expression: &Expression,
    context: &ExpressionParserContext<'_>,
) -> ExpressionParseResult<Box<dyn ExpressionExecutor>> {
    match expression {
        Expression::Constant(constant) => {
            let (value, value_type) = convert_constant(&constant.value);
            Ok(Box::new(ConstantExpressionExecutor::new(value, value_type)))
        }
        Expression::Variable(variable) => parse_variable(variable, context),
        Expression::Compare(compare) => {
            let left = parse_expression(&compare.left_expression, context)?;
            let right = parse_expression(&compare.right_expression, context)?;
            Ok(Box::new(
                CompareExpressionExecutor::new(left, right, compare.operator)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::And(and) => {
            let left = parse_expression(&and.left_expression, context)?;
            let right = parse_expression(&and.right_expression, context)?;
            Ok(Box::new(
                AndExpressionExecutor::new(left, right)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::Or(or) => {
            let left = parse_expression(&or.left_expression, context)?;
            let right = parse_expression(&or.right_expression, context)?;
            Ok(Box::new(
                OrExpressionExecutor::new(left, right)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::Not(not) => {
            let inner = parse_expression(&not.expression, context)?;
            Ok(Box::new(
                NotExpressionExecutor::new(inner)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::Add(op) => {
            let left = parse_expression(&op.left_value, context)?;
            let right = parse_expression(&op.right_value, context)?;
            Ok(Box::new(AddExpressionExecutor::new(left, right).map_err(
                |e| ExpressionParseError::new(e, context.query_name),
            )?))
        }
        Expression::Subtract(op) => {
            let left = parse_expression(&op.left_value, context)?;
            let right = parse_expression(&op.right_value, context)?;
            Ok(Box::new(
                SubtractExpressionExecutor::new(left, right)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::Multiply(op) => {
            let left = parse_expression(&op.left_value, context)?;
            let right = parse_expression(&op.right_value, context)?;
            Ok(Box::new(
                MultiplyExpressionExecutor::new(left, right)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
        Expression::Divide(op) => {
            let left = parse_expression(&op.left_value, context)?;
            let right = parse_expression(&op.right_value, context)?;
            Ok(Box::new(
                DivideExpressionExecutor::new(left, right)
                    .map_err(|e| ExpressionParseError::new(e, context.query_name))?,
            ))
        }
    }
}

fn parse_variable(
    variable: &Variable,
    context: &ExpressionParserContext<'_>,
) -> ExpressionParseResult<Box<dyn ExpressionExecutor>> {
    let meta = context.matching_meta;
    let name = &variable.attribute_name;

    let in_table = meta.table_definition.attribute_position(name);
    let in_matching = meta.matching_definition.attribute_position(name);

    let (event_index, attribute_index, attr_type) = match variable.source_id.as_deref() {
        Some(id) if id == meta.table_definition.id => {
            let idx = in_table.ok_or_else(|| {
                ExpressionParseError::new(
                    format!("Attribute '{name}' not found in table '{id}'"),
                    context.query_name,
                )
            })?;
            (
                meta.store_event_index,
                idx,
                meta.table_definition.attribute_list[idx].attr_type,
            )
        }
        Some(id) if id == meta.matching_definition.id => {
            let idx = in_matching.ok_or_else(|| {
                ExpressionParseError::new(
                    format!("Attribute '{name}' not found in stream '{id}'"),
                    context.query_name,
                )
            })?;
            (
                meta.matching_event_index,
                idx,
                meta.matching_definition.attribute_list[idx].attr_type,
            )
        }
        Some(id) => {
            return Err(ExpressionParseError::new(
                format!("Unknown source '{id}' for attribute '{name}'"),
                context.query_name,
            ));
        }
        None => match (in_table, in_matching) {
            (Some(_), Some(_)) => {
                return Err(ExpressionParseError::new(
                    format!(
                        "Attribute '{name}' found in both table '{}' and stream '{}', \
                         qualify it with a source",
                        meta.table_definition.id, meta.matching_definition.id
                    ),
                    context.query_name,
                ));
            }
            (Some(idx), None) => (
                meta.store_event_index,
                idx,
                meta.table_definition.attribute_list[idx].attr_type,
            ),
            (None, Some(idx)) => (
                meta.matching_event_index,
                idx,
                meta.matching_definition.attribute_list[idx].attr_type,
            ),
            (None, None) => {
                return Err(ExpressionParseError::new(
                    format!("Variable '{name}' not found"),
                    context.query_name,
                ));
            }
        },
    };

    Ok(Box::new(VariableExpressionExecutor::new(
        VariablePosition {
            event_index,
            attribute_index,
        },
        attr_type,
        name.clone(),
    )))
}

fn convert_constant(value: &ConstantValue) -> (AttributeValue, Type) {
    match value {
        ConstantValue::String(s) => (AttributeValue::String(s.clone()), Type::STRING),
        ConstantValue::Int(i) => (AttributeValue::Int(*i), Type::INT),
        ConstantValue::Long(l) => (AttributeValue::Long(*l), Type::LONG),
        ConstantValue::Float(f) => (AttributeValue::Float(*f), Type::FLOAT),
        ConstantValue::Double(d) => (AttributeValue::Double(*d), Type::DOUBLE),
        ConstantValue::Bool(b) => (AttributeValue::Bool(*b), Type::BOOL),
        ConstantValue::Null => (AttributeValue::Null, Type::OBJECT),
    }
}
