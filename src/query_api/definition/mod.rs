// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream and table definitions: an identifier plus an ordered attribute list.

/// Semantic type of an attribute.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    STRING,
    INT,
    LONG,
    FLOAT,
    DOUBLE,
    BOOL,
    OBJECT,
}

impl Type {
    /// True for INT, LONG, FLOAT and DOUBLE.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::INT | Type::LONG | Type::FLOAT | Type::DOUBLE)
    }

    /// Rank within the numeric promotion order INT < LONG < FLOAT < DOUBLE.
    /// `None` for non-numeric types.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            Type::INT => Some(0),
            Type::LONG => Some(1),
            Type::FLOAT => Some(2),
            Type::DOUBLE => Some(3),
            _ => None,
        }
    }
}

/// A named, typed column of a stream or table schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub attr_type: Type,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: Type) -> Self {
        Self {
            name: name.into(),
            attr_type,
        }
    }
}

/// Definition of an event stream.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StreamDefinition {
    pub id: String,
    pub attribute_list: Vec<Attribute>,
}

impl StreamDefinition {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute_list: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, attr_type: Type) -> Self {
        self.attribute_list.push(Attribute::new(name, attr_type));
        self
    }

    pub fn attribute_position(&self, name: &str) -> Option<usize> {
        self.attribute_list.iter().position(|a| a.name == name)
    }
}

/// Immutable descriptor of a table: a unique identifier and an ordered
/// sequence of column descriptors. Created at query-compile time and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TableDefinition {
    pub id: String,
    pub attribute_list: Vec<Attribute>,
}

impl TableDefinition {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute_list: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, attr_type: Type) -> Self {
        self.attribute_list.push(Attribute::new(name, attr_type));
        self
    }

    pub fn attribute_position(&self, name: &str) -> Option<usize> {
        self.attribute_list.iter().position(|a| a.name == name)
    }
}
