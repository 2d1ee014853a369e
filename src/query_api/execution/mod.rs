// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update-set clause of UPDATE / UPSERT statements.

use crate::query_api::expression::Expression;

/// One `SET column = expression` assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct SetAttribute {
    /// Name of the table column being assigned.
    pub column_name: String,
    /// Expression evaluated against the incoming state event to produce the
    /// new column value.
    pub value_to_set: Expression,
}

/// Ordered list of column assignments, as written in the query.
///
/// Compiled once per table via `Table::compile_update_set`; the compiled form
/// carries validated column indices so no name resolution happens on the
/// event path.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UpdateSet {
    pub set_attributes: Vec<SetAttribute>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column_name: impl Into<String>, value_to_set: Expression) -> Self {
        self.set_attributes.push(SetAttribute {
            column_name: column_name.into(),
            value_to_set,
        });
        self
    }
}
