// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::{ConfigReader, RivuletAppContext};
use crate::core::event::state::state_event::{StateEvent, StateEventChunk};
use crate::core::event::stream::stream_event::{StreamEvent, StreamEventChunk};
use crate::core::event::stream::stream_event_factory::{StreamEventCloner, StreamEventFactory};
use crate::core::event::value::AttributeValue;
use crate::core::exception::RivuletError;
use crate::core::executor::ExpressionExecutor;
use crate::core::table::{
    AddingStreamEventExtractor, CompiledCondition, CompiledUpdateSet, MatchingMetaInfo, Table,
    TableBackend,
};
use crate::core::util::parser::expression_parser::{parse_expression, ExpressionParserContext};
use crate::query_api::definition::{TableDefinition, Type};
use crate::query_api::execution::UpdateSet;
use crate::query_api::expression::Expression;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Condition representation used by [`InMemoryTable`]: a compiled executor
/// tree plus the state-event slot the candidate row is injected into before
/// each evaluation.
#[derive(Debug)]
pub struct InMemoryCompiledCondition {
    executor: Box<dyn ExpressionExecutor>,
    store_event_index: usize,
}

impl CompiledCondition for InMemoryCompiledCondition {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Debug)]
struct CompiledAssignment {
    column_index: usize,
    column_type: Type,
    value_executor: Box<dyn ExpressionExecutor>,
}

/// Update-set representation used by [`InMemoryTable`]: column indices and
/// types validated at compile time, one value executor per assignment.
/// Evaluated against the state event its companion condition has already
/// populated with the matched row, so the assignments see the pre-update
/// column values.
#[derive(Debug)]
pub struct InMemoryCompiledUpdateSet {
    assignments: Vec<CompiledAssignment>,
}

impl CompiledUpdateSet for InMemoryCompiledUpdateSet {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Reference backend holding rows in process memory.
///
/// The table is a multiset: duplicate rows are stored, deleted and updated
/// as individual entries. `connect` is trivially available, so the facade's
/// reconnect machinery only ever engages for external backends — this type
/// doubles as the semantic baseline their behavior is tested against.
#[derive(Debug, Default)]
pub struct InMemoryTable {
    table_definition: Arc<TableDefinition>,
    event_cloner: Option<StreamEventCloner>,
    rows: RwLock<Vec<Vec<AttributeValue>>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn downcast_condition<'a>(
        &self,
        compiled_condition: &'a dyn CompiledCondition,
    ) -> Result<&'a InMemoryCompiledCondition, RivuletError> {
        compiled_condition
            .as_any()
            .downcast_ref()
            .ok_or_else(|| RivuletError::Storage {
                table_name: self.table_definition.id.clone(),
                message: "compiled condition was not produced by this table".to_string(),
            })
    }

    fn downcast_update_set<'a>(
        &self,
        compiled_update_set: &'a dyn CompiledUpdateSet,
    ) -> Result<&'a InMemoryCompiledUpdateSet, RivuletError> {
        compiled_update_set
            .as_any()
            .downcast_ref()
            .ok_or_else(|| RivuletError::Storage {
                table_name: self.table_definition.id.clone(),
                message: "compiled update set was not produced by this table".to_string(),
            })
    }

    /// Evaluate a compiled condition against one candidate row.
    ///
    /// `scratch` is the matching event with a free slot at the condition's
    /// store position; the row is written into the reused `row_event` and
    /// injected there before evaluation, so one allocation pattern serves
    /// the whole scan.
    fn row_matches(
        condition: &InMemoryCompiledCondition,
        scratch: &mut StateEvent,
        row_event: &mut StreamEvent,
        row: &[AttributeValue],
    ) -> bool {
        for slot in row_event.before_window_data.iter_mut() {
            *slot = AttributeValue::Null;
        }
        for (i, value) in row.iter().enumerate() {
            if i < row_event.before_window_data.len() {
                row_event.before_window_data[i] = value.clone();
            }
        }
        scratch.set_stream_event(condition.store_event_index, Some(row_event.clone()));
        matches!(
            condition.executor.execute(Some(&*scratch)),
            Some(AttributeValue::Bool(true))
        )
    }

    /// Scratch state event for a scan: the matching event with its chain
    /// link severed.
    fn scratch_for(matching_event: &StateEvent) -> StateEvent {
        let mut scratch = matching_event.clone();
        scratch.next = None;
        scratch
    }

    fn apply_update_set(
        update_set: &InMemoryCompiledUpdateSet,
        scratch: &StateEvent,
        row: &mut [AttributeValue],
    ) {
        for assignment in &update_set.assignments {
            let value = assignment
                .value_executor
                .execute(Some(scratch))
                .map(|v| {
                    v.coerce_numeric(assignment.column_type)
                        .unwrap_or(v)
                })
                .unwrap_or(AttributeValue::Null);
            if assignment.column_index < row.len() {
                row[assignment.column_index] = value;
            }
        }
    }

    fn check_meta_binding(
        &self,
        matching_meta: &MatchingMetaInfo,
        query_name: &str,
    ) -> Result<(), RivuletError> {
        if matching_meta.table_definition.as_ref() != self.table_definition.as_ref() {
            return Err(RivuletError::TableCompile {
                table_name: self.table_definition.id.clone(),
                message: format!(
                    "matching meta is bound to table '{}', not '{}' (query '{}')",
                    matching_meta.table_definition.id, self.table_definition.id, query_name
                ),
            });
        }
        Ok(())
    }
}

impl TableBackend for InMemoryTable {
    fn init(
        &mut self,
        table_definition: &Arc<TableDefinition>,
        _event_factory: &StreamEventFactory,
        event_cloner: &StreamEventCloner,
        _config_reader: &ConfigReader,
        _app_context: &Arc<RivuletAppContext>,
    ) -> Result<(), RivuletError> {
        self.table_definition = Arc::clone(table_definition);
        self.event_cloner = Some(event_cloner.clone());
        Ok(())
    }

    fn connect(&self) -> Result<(), RivuletError> {
        Ok(())
    }

    fn disconnect(&self) {}

    fn destroy(&self) {
        self.rows.write().unwrap().clear();
    }

    fn add(&self, adding_event_chunk: &StreamEventChunk) -> Result<(), RivuletError> {
        let mut rows = self.rows.write().unwrap();
        for event in adding_event_chunk.iter() {
            rows.push(event.row_values().to_vec());
        }
        Ok(())
    }

    fn find(
        &self,
        compiled_condition: &dyn CompiledCondition,
        matching_event: &StateEvent,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError> {
        let condition = self.downcast_condition(compiled_condition)?;
        let rows = self.rows.read().unwrap();
        let mut scratch = Self::scratch_for(matching_event);
        let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut row_event = StreamEvent::new(matching_event.timestamp, max_cols);

        let mut results = StreamEventChunk::new();
        for row in rows.iter() {
            if Self::row_matches(condition, &mut scratch, &mut row_event, row) {
                // Matched rows leave the table as fresh schema-sized events.
                let event = match &self.event_cloner {
                    Some(cloner) => cloner.copy_stream_event(&row_event),
                    None => row_event.clone(),
                };
                results.add(Box::new(event));
            }
        }
        Ok(results.take_first())
    }

    fn delete(
        &self,
        deleting_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<(), RivuletError> {
        let condition = self.downcast_condition(compiled_condition)?;
        let mut rows = self.rows.write().unwrap();
        for deleting_event in deleting_event_chunk.iter() {
            let mut scratch = Self::scratch_for(deleting_event);
            let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
            let mut row_event = StreamEvent::new(deleting_event.timestamp, max_cols);
            rows.retain(|row| !Self::row_matches(condition, &mut scratch, &mut row_event, row));
        }
        Ok(())
    }

    fn update(
        &self,
        updating_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
    ) -> Result<(), RivuletError> {
        let condition = self.downcast_condition(compiled_condition)?;
        let update_set = self.downcast_update_set(compiled_update_set)?;
        let mut rows = self.rows.write().unwrap();
        for updating_event in updating_event_chunk.iter() {
            let mut scratch = Self::scratch_for(updating_event);
            let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
            let mut row_event = StreamEvent::new(updating_event.timestamp, max_cols);
            for row in rows.iter_mut() {
                if Self::row_matches(condition, &mut scratch, &mut row_event, row) {
                    // The scratch still carries the pre-update row at the
                    // store slot, so SET expressions read the old values.
                    Self::apply_update_set(update_set, &scratch, row);
                }
            }
        }
        Ok(())
    }

    fn update_or_add(
        &self,
        update_or_adding_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
        adding_stream_event_extractor: &AddingStreamEventExtractor,
    ) -> Result<(), RivuletError> {
        let condition = self.downcast_condition(compiled_condition)?;
        let update_set = self.downcast_update_set(compiled_update_set)?;
        let mut rows = self.rows.write().unwrap();
        for state_event in update_or_adding_event_chunk.iter() {
            let mut scratch = Self::scratch_for(state_event);
            let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
            let mut row_event = StreamEvent::new(state_event.timestamp, max_cols);
            let mut matched = false;
            for row in rows.iter_mut() {
                if Self::row_matches(condition, &mut scratch, &mut row_event, row) {
                    matched = true;
                    Self::apply_update_set(update_set, &scratch, row);
                }
            }
            if !matched {
                if let Some(adding_event) = adding_stream_event_extractor.extract(state_event) {
                    rows.push(adding_event.row_values().to_vec());
                }
            }
        }
        Ok(())
    }

    fn contains(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<bool, RivuletError> {
        let condition = self.downcast_condition(compiled_condition)?;
        let rows = self.rows.read().unwrap();
        let mut scratch = Self::scratch_for(matching_event);
        let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut row_event = StreamEvent::new(matching_event.timestamp, max_cols);
        Ok(rows
            .iter()
            .any(|row| Self::row_matches(condition, &mut scratch, &mut row_event, row)))
    }

    fn compile_condition(
        &self,
        condition: &Expression,
        matching_meta: &MatchingMetaInfo,
        _table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledCondition>, RivuletError> {
        self.check_meta_binding(matching_meta, query_name)?;
        let context = ExpressionParserContext {
            matching_meta,
            query_name,
        };
        let executor =
            parse_expression(condition, &context).map_err(|e| RivuletError::TableCompile {
                table_name: self.table_definition.id.clone(),
                message: e.to_string(),
            })?;
        if executor.get_return_type() != Type::BOOL {
            return Err(RivuletError::TableCompile {
                table_name: self.table_definition.id.clone(),
                message: format!(
                    "condition must evaluate to BOOL, found {:?} (query '{}')",
                    executor.get_return_type(),
                    query_name
                ),
            });
        }
        Ok(Box::new(InMemoryCompiledCondition {
            executor,
            store_event_index: matching_meta.store_event_index,
        }))
    }

    fn compile_update_set(
        &self,
        update_set: &UpdateSet,
        matching_meta: &MatchingMetaInfo,
        _table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledUpdateSet>, RivuletError> {
        self.check_meta_binding(matching_meta, query_name)?;
        let context = ExpressionParserContext {
            matching_meta,
            query_name,
        };
        let mut assignments = Vec::with_capacity(update_set.set_attributes.len());
        for set_attribute in &update_set.set_attributes {
            let column_index = self
                .table_definition
                .attribute_position(&set_attribute.column_name)
                .ok_or_else(|| RivuletError::TableCompile {
                    table_name: self.table_definition.id.clone(),
                    message: format!(
                        "no column '{}' to update (query '{}')",
                        set_attribute.column_name, query_name
                    ),
                })?;
            let column_type = self.table_definition.attribute_list[column_index].attr_type;
            let value_executor = parse_expression(&set_attribute.value_to_set, &context).map_err(
                |e| RivuletError::TableCompile {
                    table_name: self.table_definition.id.clone(),
                    message: e.to_string(),
                },
            )?;
            let value_type = value_executor.get_return_type();
            if !assignable(value_type, column_type) {
                return Err(RivuletError::TableCompile {
                    table_name: self.table_definition.id.clone(),
                    message: format!(
                        "cannot assign {:?} to column '{}' of type {:?} (query '{}')",
                        value_type, set_attribute.column_name, column_type, query_name
                    ),
                });
            }
            assignments.push(CompiledAssignment {
                column_index,
                column_type,
                value_executor,
            });
        }
        Ok(Box::new(InMemoryCompiledUpdateSet { assignments }))
    }
}

/// A value of `value_type` may be stored into a column of `column_type`:
/// same type, or a widening numeric promotion.
fn assignable(value_type: Type, column_type: Type) -> bool {
    if value_type == column_type {
        return true;
    }
    match (value_type.numeric_rank(), column_type.numeric_rank()) {
        (Some(v), Some(c)) => v <= c,
        _ => false,
    }
}
