// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::query_api::definition::Type;

/// Runtime value of a single event attribute.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    #[default]
    Null,
}

impl AttributeValue {
    /// The `Type` this value inhabits, or `None` for `Null`.
    pub fn value_type(&self) -> Option<Type> {
        match self {
            AttributeValue::String(_) => Some(Type::STRING),
            AttributeValue::Int(_) => Some(Type::INT),
            AttributeValue::Long(_) => Some(Type::LONG),
            AttributeValue::Float(_) => Some(Type::FLOAT),
            AttributeValue::Double(_) => Some(Type::DOUBLE),
            AttributeValue::Bool(_) => Some(Type::BOOL),
            AttributeValue::Null => None,
        }
    }

    /// Numeric reading as f64, for cross-type comparison and arithmetic.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Long(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v as f64),
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen a numeric value into `target`. Values already of `target`'s
    /// type pass through; non-numeric values and narrowing requests return
    /// `None`. Update-set compilation guarantees the promotion is legal, so
    /// the event path never sees a `None` here for validated assignments.
    pub fn coerce_numeric(&self, target: Type) -> Option<AttributeValue> {
        if self.value_type() == Some(target) {
            return Some(self.clone());
        }
        match (self, target) {
            (AttributeValue::Int(v), Type::LONG) => Some(AttributeValue::Long(*v as i64)),
            (AttributeValue::Int(v), Type::FLOAT) => Some(AttributeValue::Float(*v as f32)),
            (AttributeValue::Int(v), Type::DOUBLE) => Some(AttributeValue::Double(*v as f64)),
            (AttributeValue::Long(v), Type::FLOAT) => Some(AttributeValue::Float(*v as f32)),
            (AttributeValue::Long(v), Type::DOUBLE) => Some(AttributeValue::Double(*v as f64)),
            (AttributeValue::Float(v), Type::DOUBLE) => Some(AttributeValue::Double(*v as f64)),
            _ => None,
        }
    }
}
