// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tables: mutable relational state that queries read from, join against,
//! and mutate.
//!
//! Every table — in-memory or fronting an external store — is driven through
//! the same [`Table`] facade. The facade owns the connection lifecycle (the
//! `connected` / `trying_to_connect` flag pair), translates the distinguished
//! [`RivuletError::ConnectionUnavailable`] into a bounded reconnect-and-retry
//! sequence, and drops events with diagnostics while a reconnect is pending.
//! Storage semantics plug in through the [`TableBackend`] adapter contract.
//!
//! # Retry discipline
//!
//! A CRUD call that hits a disconnection re-executes its primitive at most
//! once synchronously; after that, reconnect attempts run on the shared
//! scheduler under exponential backoff and arriving events are dropped (with
//! an error-level log carrying the payload) until the table is connected
//! again. Buffering is deliberately not offered: the engine processes
//! unbounded streams, and buffering across a multi-minute outage would
//! exhaust memory. Upstream adapters that need durability replay themselves.
//!
//! # Lock poisoning
//!
//! In-process backends guard their state with `RwLock` and call `.unwrap()`
//! on the guards. A poisoned lock means a thread panicked mid-mutation; for
//! a stream processing engine it is better to crash and restart from a
//! checkpoint than to keep processing against corrupted state.

mod in_memory_table;

pub use in_memory_table::InMemoryTable;

use crate::core::config::{ConfigReader, RivuletAppContext};
use crate::core::event::state::state_event::{StateEvent, StateEventChunk};
use crate::core::event::stream::stream_event::{StreamEvent, StreamEventChunk};
use crate::core::event::stream::stream_event_factory::{StreamEventCloner, StreamEventFactory};
use crate::core::exception::RivuletError;
use crate::core::util::backoff_retry_counter::BackoffRetryCounter;
use crate::query_api::definition::{StreamDefinition, TableDefinition};
use crate::query_api::execution::UpdateSet;
use crate::query_api::expression::Expression;
use log::error;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Opaque predicate compiled once against a table schema and a matching
/// event shape. Evaluating it against mismatched inputs is rejected at
/// compile time, never at event arrival.
pub trait CompiledCondition: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Opaque, validated list of column-assignment plans produced by
/// [`Table::compile_update_set`].
pub trait CompiledUpdateSet: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Schemas and state-event positions a condition or update set is compiled
/// against: which slot of the `StateEvent` carries the matching event and
/// which slot the backend fills with the candidate table row.
#[derive(Clone, Debug)]
pub struct MatchingMetaInfo {
    pub matching_definition: Arc<StreamDefinition>,
    pub table_definition: Arc<TableDefinition>,
    pub matching_event_index: usize,
    pub store_event_index: usize,
}

impl MatchingMetaInfo {
    pub fn new(
        matching_definition: Arc<StreamDefinition>,
        table_definition: Arc<TableDefinition>,
        matching_event_index: usize,
        store_event_index: usize,
    ) -> Self {
        Self {
            matching_definition,
            table_definition,
            matching_event_index,
            store_event_index,
        }
    }
}

/// Yields, for a state event, the stream event to insert when an
/// `update_or_add` call matches no existing row. Immutable data fixed at
/// query-compile time.
#[derive(Clone, Copy, Debug)]
pub struct AddingStreamEventExtractor {
    stream_event_index: usize,
}

impl AddingStreamEventExtractor {
    pub fn new(stream_event_index: usize) -> Self {
        Self { stream_event_index }
    }

    pub fn stream_event_index(&self) -> usize {
        self.stream_event_index
    }

    pub fn extract<'a>(&self, state_event: &'a StateEvent) -> Option<&'a StreamEvent> {
        state_event.stream_event(self.stream_event_index)
    }
}

/// Lookup capability exposed to join processors: returns the chain of rows
/// matching `matching_event`, or `None` when nothing matches.
pub trait FindableProcessor {
    fn find(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError>;
}

/// Adapter contract each concrete storage backend implements.
///
/// Primitives report transient connectivity loss as
/// [`RivuletError::ConnectionUnavailable`]; any other error is treated as
/// fatal by the facade and propagated. Primitives must not be called before
/// `connect` has succeeded — the facade guarantees that ordering.
pub trait TableBackend: Debug + Send + Sync {
    /// One-shot initialization. Must not open network connections; those
    /// belong to `connect`.
    fn init(
        &mut self,
        table_definition: &Arc<TableDefinition>,
        event_factory: &StreamEventFactory,
        event_cloner: &StreamEventCloner,
        config_reader: &ConfigReader,
        app_context: &Arc<RivuletAppContext>,
    ) -> Result<(), RivuletError>;

    /// Establish backend resources.
    fn connect(&self) -> Result<(), RivuletError>;

    /// Release resources without destroying them.
    fn disconnect(&self);

    /// Release everything. Idempotent.
    fn destroy(&self);

    fn add(&self, adding_event_chunk: &StreamEventChunk) -> Result<(), RivuletError>;

    fn find(
        &self,
        compiled_condition: &dyn CompiledCondition,
        matching_event: &StateEvent,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError>;

    fn delete(
        &self,
        deleting_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<(), RivuletError>;

    fn update(
        &self,
        updating_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
    ) -> Result<(), RivuletError>;

    fn update_or_add(
        &self,
        update_or_adding_event_chunk: &StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
        adding_stream_event_extractor: &AddingStreamEventExtractor,
    ) -> Result<(), RivuletError>;

    fn contains(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<bool, RivuletError>;

    /// Compile a predicate into a backend-specific representation.
    /// Deterministic and side-effect free.
    fn compile_condition(
        &self,
        condition: &Expression,
        matching_meta: &MatchingMetaInfo,
        table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledCondition>, RivuletError>;

    /// Compile the SET clause of an update query. All the pre-processing
    /// that can happen before any update event arrives happens here, so no
    /// planning work is left on the event path.
    fn compile_update_set(
        &self,
        update_set: &UpdateSet,
        matching_meta: &MatchingMetaInfo,
        table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledUpdateSet>, RivuletError>;
}

/// The table operation facade.
///
/// Thread-compatible, not thread-safe by contract: the query engine
/// serializes CRUD calls per table within an execution plan. Reconnect
/// callbacks from the shared scheduler are safe concurrently because they
/// only touch the atomic flag pair and the single-writer backoff counter.
#[derive(Debug)]
pub struct Table {
    table_definition: Arc<TableDefinition>,
    backend: Box<dyn TableBackend>,
    app_context: Arc<RivuletAppContext>,
    is_connected: AtomicBool,
    is_trying_to_connect: AtomicBool,
    backoff_retry_counter: BackoffRetryCounter,
    dropped_events: AtomicU64,
    self_ref: Weak<Table>,
}

impl Table {
    /// Initialize `backend` against `table_definition` and wrap it in the
    /// facade. No connection is opened here; the first CRUD call (or an
    /// explicit [`Table::connect_with_retry`]) triggers `connect`.
    pub fn new(
        table_definition: TableDefinition,
        mut backend: Box<dyn TableBackend>,
        config_reader: ConfigReader,
        app_context: Arc<RivuletAppContext>,
    ) -> Result<Arc<Self>, RivuletError> {
        let table_definition = Arc::new(table_definition);
        let event_factory = StreamEventFactory::new(table_definition.attribute_list.len());
        let event_cloner = StreamEventCloner::new(event_factory.clone());
        backend.init(
            &table_definition,
            &event_factory,
            &event_cloner,
            &config_reader,
            &app_context,
        )?;
        Ok(Arc::new_cyclic(|self_ref| Self {
            table_definition,
            backend,
            app_context,
            is_connected: AtomicBool::new(false),
            is_trying_to_connect: AtomicBool::new(false),
            backoff_retry_counter: BackoffRetryCounter::new(),
            dropped_events: AtomicU64::new(0),
            self_ref: self_ref.clone(),
        }))
    }

    pub fn get_table_definition(&self) -> &Arc<TableDefinition> {
        &self.table_definition
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Acquire)
    }

    pub fn is_trying_to_connect(&self) -> bool {
        self.is_trying_to_connect.load(Ordering::Acquire)
    }

    /// Number of events dropped while the table was reconnecting.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Insert a batch of rows.
    pub fn add_events(&self, adding_event_chunk: StreamEventChunk) -> Result<(), RivuletError> {
        self.guarded(
            "add",
            adding_event_chunk.len() as u64,
            || format!("{adding_event_chunk:?}"),
            || (),
            || self.backend.add(&adding_event_chunk),
        )
    }

    /// Look up the rows matching `matching_event` under `compiled_condition`.
    /// Returns them as a chain of stream events, or `None` when nothing
    /// matches or the table is mid-reconnect.
    pub fn find(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError> {
        self.guarded(
            "find",
            1,
            || format!("{matching_event:?}"),
            || None,
            || self.backend.find(compiled_condition, matching_event),
        )
    }

    /// Delete the rows matched by each event of the chunk.
    pub fn delete_events(
        &self,
        deleting_event_chunk: StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<(), RivuletError> {
        self.guarded(
            "delete",
            deleting_event_chunk.len() as u64,
            || format!("{deleting_event_chunk:?}"),
            || (),
            || self.backend.delete(&deleting_event_chunk, compiled_condition),
        )
    }

    /// Rewrite the rows matched by each event of the chunk using the
    /// compiled assignments.
    pub fn update_events(
        &self,
        updating_event_chunk: StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
    ) -> Result<(), RivuletError> {
        self.guarded(
            "update",
            updating_event_chunk.len() as u64,
            || format!("{updating_event_chunk:?}"),
            || (),
            || {
                self.backend
                    .update(&updating_event_chunk, compiled_condition, compiled_update_set)
            },
        )
    }

    /// Update matching rows, or insert the extracted stream event for
    /// events that match nothing.
    pub fn update_or_add_events(
        &self,
        update_or_adding_event_chunk: StateEventChunk,
        compiled_condition: &dyn CompiledCondition,
        compiled_update_set: &dyn CompiledUpdateSet,
        adding_stream_event_extractor: &AddingStreamEventExtractor,
    ) -> Result<(), RivuletError> {
        self.guarded(
            "updateOrAdd",
            update_or_adding_event_chunk.len() as u64,
            || format!("{update_or_adding_event_chunk:?}"),
            || (),
            || {
                self.backend.update_or_add(
                    &update_or_adding_event_chunk,
                    compiled_condition,
                    compiled_update_set,
                    adding_stream_event_extractor,
                )
            },
        )
    }

    /// True when at least one row matches `matching_event`. Returns `false`
    /// while the table is mid-reconnect.
    pub fn contains_event(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<bool, RivuletError> {
        self.guarded(
            "contains",
            1,
            || format!("{matching_event:?}"),
            || false,
            || self.backend.contains(matching_event, compiled_condition),
        )
    }

    pub fn compile_condition(
        &self,
        condition: &Expression,
        matching_meta: &MatchingMetaInfo,
        table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledCondition>, RivuletError> {
        self.backend
            .compile_condition(condition, matching_meta, table_map, query_name)
    }

    pub fn compile_update_set(
        &self,
        update_set: &UpdateSet,
        matching_meta: &MatchingMetaInfo,
        table_map: &HashMap<String, Arc<Table>>,
        query_name: &str,
    ) -> Result<Box<dyn CompiledUpdateSet>, RivuletError> {
        self.backend
            .compile_update_set(update_set, matching_meta, table_map, query_name)
    }

    /// Lifecycle core shared by every CRUD call.
    ///
    /// `connected` → run the primitive; on `ConnectionUnavailable` mark the
    /// table disconnected, reconnect, and re-run the primitive at most once.
    /// `trying_to_connect` → drop with diagnostics, bounded-time return.
    /// Neither → connect first, then take the call from the top.
    fn guarded<T>(
        &self,
        operation: &str,
        event_count: u64,
        payload: impl Fn() -> String,
        drop_result: impl FnOnce() -> T,
        primitive: impl Fn() -> Result<T, RivuletError>,
    ) -> Result<T, RivuletError> {
        let mut retried = false;
        loop {
            if self.is_connected.load(Ordering::Acquire) {
                match primitive() {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_connection_unavailable() => {
                        self.is_connected.store(false, Ordering::Release);
                        error!(
                            "Error on '{}'. Connection unavailable at table '{}' during {}, \
                             will retry connection immediately: {}",
                            self.app_context.name(),
                            self.table_definition.id,
                            operation,
                            e
                        );
                        if retried {
                            // Second disconnection within one call: hand the
                            // reconnect to the scheduler and drop.
                            self.connect_with_retry()?;
                            self.log_dropped(operation, event_count, &payload());
                            return Ok(drop_result());
                        }
                        retried = true;
                        self.connect_with_retry()?;
                    }
                    Err(e) => return Err(e),
                }
            } else if self.is_trying_to_connect.load(Ordering::Acquire) {
                self.log_dropped(operation, event_count, &payload());
                return Ok(drop_result());
            } else {
                self.connect_with_retry()?;
            }
        }
    }

    fn log_dropped(&self, operation: &str, event_count: u64, payload: &str) {
        self.dropped_events.fetch_add(event_count, Ordering::Relaxed);
        error!(
            "Error on '{}'. Dropping event at table '{}' as it is still trying to reconnect, \
             {} payload: {}",
            self.app_context.name(),
            self.table_definition.id,
            operation,
            payload
        );
    }

    /// Drive the backend towards a connection.
    ///
    /// Blocks for a single `connect` attempt. On transient failure the next
    /// attempt is scheduled on the shared scheduler after the current
    /// backoff interval and this call returns immediately; a caller that
    /// finds `trying_to_connect` set never waits on the reconnect chain.
    ///
    /// A non-transient `connect` failure clears `trying_to_connect` before
    /// propagating, so a later call re-enters the connect path instead of
    /// dropping events forever.
    pub fn connect_with_retry(&self) -> Result<(), RivuletError> {
        if self.is_connected.load(Ordering::Acquire) {
            return Ok(());
        }
        self.is_trying_to_connect.store(true, Ordering::Release);
        match self.backend.connect() {
            Ok(()) => {
                self.is_connected.store(true, Ordering::Release);
                self.is_trying_to_connect.store(false, Ordering::Release);
                self.backoff_retry_counter.reset();
                Ok(())
            }
            Err(e) if e.is_connection_unavailable() => {
                error!(
                    "Error on '{}'. Error while connecting to table '{}', will retry in '{}': {}",
                    self.app_context.name(),
                    self.table_definition.id,
                    self.backoff_retry_counter.time_interval(),
                    e
                );
                if let Some(table) = self.self_ref.upgrade() {
                    let delay =
                        Duration::from_millis(self.backoff_retry_counter.time_interval_millis());
                    self.app_context.scheduler().schedule(
                        delay,
                        Box::new(move || {
                            if let Err(e) = table.connect_with_retry() {
                                error!(
                                    "Error on '{}'. Scheduled reconnect of table '{}' failed: {}",
                                    table.app_context.name(),
                                    table.table_definition.id,
                                    e
                                );
                            }
                        }),
                    );
                }
                self.backoff_retry_counter.increment();
                Ok(())
            }
            Err(e) => {
                self.is_trying_to_connect.store(false, Ordering::Release);
                error!(
                    "Error on '{}'. Error while connecting to table '{}': {}",
                    self.app_context.name(),
                    self.table_definition.id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Disconnect and destroy the backend, then clear both lifecycle flags.
    /// The table is terminal afterwards; a later CRUD call re-enters the
    /// connect path rather than being rejected.
    pub fn shutdown(&self) {
        self.backend.disconnect();
        self.backend.destroy();
        self.is_connected.store(false, Ordering::Release);
        self.is_trying_to_connect.store(false, Ordering::Release);
    }
}

impl FindableProcessor for Table {
    fn find(
        &self,
        matching_event: &StateEvent,
        compiled_condition: &dyn CompiledCondition,
    ) -> Result<Option<Box<StreamEvent>>, RivuletError> {
        Table::find(self, matching_event, compiled_condition)
    }
}
