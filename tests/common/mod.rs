// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test fixtures: a virtual-time scheduler, a scripted backend that
//! stands in for an external store, and event/schema builders.

#![allow(dead_code)]

use rivulet::core::config::{ConfigReader, RivuletAppContext};
use rivulet::core::event::state::state_event::{StateEvent, StateEventChunk};
use rivulet::core::event::stream::stream_event::{StreamEvent, StreamEventChunk};
use rivulet::core::event::stream::stream_event_factory::{StreamEventCloner, StreamEventFactory};
use rivulet::core::event::value::AttributeValue;
use rivulet::core::exception::RivuletError;
use rivulet::core::table::{
    AddingStreamEventExtractor, CompiledCondition, CompiledUpdateSet, MatchingMetaInfo, Table,
    TableBackend,
};
use rivulet::core::util::scheduler::RetryScheduler;
use rivulet::query_api::definition::{StreamDefinition, TableDefinition, Type};
use rivulet::query_api::execution::UpdateSet;
use rivulet::query_api::expression::Expression;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Virtual-time scheduler
// ---------------------------------------------------------------------------

type ScheduledTask = (Duration, Box<dyn FnOnce() + Send>);

/// Scheduler that records tasks instead of running them, so tests drive the
/// reconnect chain step by step in virtual time.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<VecDeque<ScheduledTask>>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn pending_delays(&self) -> Vec<Duration> {
        self.tasks.lock().unwrap().iter().map(|t| t.0).collect()
    }

    /// Run the earliest scheduled task, returning the delay it was scheduled
    /// with. Tasks rescheduled by the running task are recorded as usual.
    pub fn run_next(&self) -> Option<Duration> {
        let (delay, task) = self.tasks.lock().unwrap().pop_front()?;
        task();
        Some(delay)
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl RetryScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) {
        self.tasks.lock().unwrap().push_back((delay, task));
    }
}

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

/// Observable side of a [`ScriptedBackend`].
#[derive(Debug, Default)]
pub struct BackendProbe {
    pub connect_calls: AtomicU64,
    pub add_calls: AtomicU64,
    pub find_calls: AtomicU64,
    pub disconnect_calls: AtomicU64,
    pub destroy_calls: AtomicU64,
    pub rows: Mutex<Vec<Vec<AttributeValue>>>,
}

/// Failure script of a [`ScriptedBackend`]. Errors queued here are returned
/// once each, in order; an empty queue means success.
#[derive(Debug, Default)]
pub struct BackendScript {
    pub connect_errors: Mutex<VecDeque<RivuletError>>,
    pub add_errors: Mutex<VecDeque<RivuletError>>,
    pub fail_connect_forever: AtomicBool,
}

impl BackendScript {
    pub fn push_connect_error(&self, error: RivuletError) {
        self.connect_errors.lock().unwrap().push_back(error);
    }

    pub fn push_add_error(&self, error: RivuletError) {
        self.add_errors.lock().unwrap().push_back(error);
    }

    pub fn set_fail_connect_forever(&self, fail: bool) {
        self.fail_connect_forever.store(fail, Ordering::SeqCst);
    }
}

/// Backend with scripted failures, standing in for an external store whose
/// connection comes and goes.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    probe: Arc<BackendProbe>,
    script: Arc<BackendScript>,
}

/// Build a scripted backend plus the handles tests observe and drive it by.
pub fn scripted_backend() -> (Box<ScriptedBackend>, Arc<BackendProbe>, Arc<BackendScript>) {
    let backend = ScriptedBackend::default();
    let probe = Arc::clone(&backend.probe);
    let script = Arc::clone(&backend.script);
    (Box::new(backend), probe, script)
}

impl TableBackend for ScriptedBackend {
    fn init(
        &mut self,
        _table_definition: &Arc<TableDefinition>,
        _event_factory: &StreamEventFactory,
        _event_cloner: &StreamEventCloner,
        _config_reader: &ConfigReader,
        _app_context: &Arc<RivuletAppContext>,
    ) -> Result<(), RivuletError> {
        Ok(())
    }

    fn connect(&self) -> Result<(), RivuletError> {
        self.probe.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_connect_forever.load(Ordering::SeqCst) {
            return Err(RivuletError::connection_unavailable("store unreachable"));
        }
        match self.script.connect_errors.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn disconnect(&self) {
        self.probe.disconnect_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self) {
        self.probe.destroy_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn add(&self, adding_event_chunk: &StreamEventChunk) -> Result<(), RivuletError> {
        self.probe.add_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.script.add_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut rows = self.probe.rows.lock().unwrap();
        for event in adding_event_chunk.iter() {
            rows.push(event.row_values().to_vec());
        }
        Ok(())
    }

    fn find(
        &self,
        _compiled_condition: &dyn CompiledCondition,
        _matching_event: &StateEvent,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError> {
        self.probe.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    fn delete(
        &self,
        _deleting_event_chunk: &StateEventChunk,
        _compiled_condition: &dyn CompiledCondition,
    ) -> Result<(), RivuletError> {
        Ok(())
    }

    fn update(
        &self,
        _updating_event_chunk: &StateEventChunk,
        _compiled_condition: &dyn CompiledCondition,
        _compiled_update_set: &dyn CompiledUpdateSet,
    ) -> Result<(), RivuletError> {
        Ok(())
    }

    fn update_or_add(
        &self,
        _update_or_adding_event_chunk: &StateEventChunk,
        _compiled_condition: &dyn CompiledCondition,
        _compiled_update_set: &dyn CompiledUpdateSet,
        _adding_stream_event_extractor: &AddingStreamEventExtractor,
    ) -> Result<(), RivuletError> {
        Ok(())
    }

    fn contains(
        &self,
        _matching_event: &StateEvent,
        _compiled_condition: &dyn CompiledCondition,
    ) -> Result<bool, RivuletError> {
        Ok(false)
    }

    fn compile_condition(
        &self,
        _condition: &Expression,
        _matching_meta: &MatchingMetaInfo,
        _table_map: &HashMap<String, Arc<Table>>,
        _query_name: &str,
    ) -> Result<Box<dyn CompiledCondition>, RivuletError> {
        Err(RivuletError::OperationNotSupported {
            operation: "compileCondition".to_string(),
            message: "scripted backend does not compile conditions".to_string(),
        })
    }

    fn compile_update_set(
        &self,
        _update_set: &UpdateSet,
        _matching_meta: &MatchingMetaInfo,
        _table_map: &HashMap<String, Arc<Table>>,
        _query_name: &str,
    ) -> Result<Box<dyn CompiledUpdateSet>, RivuletError> {
        Err(RivuletError::OperationNotSupported {
            operation: "compileUpdateSet".to_string(),
            message: "scripted backend does not compile update sets".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Schema and event builders
// ---------------------------------------------------------------------------

pub fn stock_definition() -> TableDefinition {
    TableDefinition::id("stockTable")
        .attribute("symbol", Type::STRING)
        .attribute("price", Type::LONG)
}

pub fn trigger_definition() -> StreamDefinition {
    StreamDefinition::id("triggerStream")
        .attribute("symbol", Type::STRING)
        .attribute("price", Type::LONG)
}

/// Matching meta binding the trigger stream at state position 0 and the
/// stock table row at position 1.
pub fn stock_meta() -> MatchingMetaInfo {
    MatchingMetaInfo::new(
        Arc::new(trigger_definition()),
        Arc::new(stock_definition()),
        0,
        1,
    )
}

pub fn app_context(scheduler: Arc<dyn RetryScheduler>) -> Arc<RivuletAppContext> {
    Arc::new(RivuletAppContext::new("StockApp", scheduler))
}

pub fn stream_event(values: Vec<AttributeValue>) -> Box<StreamEvent> {
    let mut event = StreamEvent::new(0, values.len());
    event.before_window_data = values;
    Box::new(event)
}

pub fn stream_chunk(rows: Vec<Vec<AttributeValue>>) -> StreamEventChunk {
    let mut chunk = StreamEventChunk::new();
    for row in rows {
        chunk.add(stream_event(row));
    }
    chunk
}

/// State event carrying the matching stream event at position 0, with
/// position 1 free for the table row.
pub fn matching_event(values: Vec<AttributeValue>) -> StateEvent {
    let mut state = StateEvent::new(0, 2);
    state.set_stream_event(0, Some(*stream_event(values)));
    state
}

pub fn state_chunk(rows: Vec<Vec<AttributeValue>>) -> StateEventChunk {
    let mut chunk = StateEventChunk::new();
    for row in rows {
        chunk.add(Box::new(matching_event(row)));
    }
    chunk
}

/// Walk a `find` result chain into plain rows.
pub fn chain_rows(head: Option<Box<StreamEvent>>) -> Vec<Vec<AttributeValue>> {
    let mut rows = Vec::new();
    let mut current = head.as_deref();
    while let Some(event) = current {
        rows.push(event.before_window_data.clone());
        current = event.next.as_deref();
    }
    rows
}
