// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rivulet — table subsystem of a complex-event-processing runtime.
//!
//! Streams flowing through a Rivulet execution plan may read from, join
//! against, and mutate auxiliary relational state ("tables"). This crate
//! provides the abstraction through which every such table — in-memory or
//! backed by an external store — is exposed to the query engine:
//!
//! - [`Table`](crate::core::table::Table): the operation facade wrapping
//!   every backend in one uniform CRUD contract, connection lifecycle
//!   handling, and bounded retry-on-disconnect logic.
//! - [`TableBackend`](crate::core::table::TableBackend): the adapter
//!   contract a concrete storage backend implements.
//! - Compiled artifacts ([`CompiledCondition`](crate::core::table::CompiledCondition),
//!   [`CompiledUpdateSet`](crate::core::table::CompiledUpdateSet)) produced
//!   once at query-compile time and evaluated on every event arrival.

pub mod core;
pub mod query_api;
