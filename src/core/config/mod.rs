// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine context and backend configuration access.

use crate::core::util::scheduler::RetryScheduler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-application engine context shared by every table: the application
/// name used in diagnostics and the scheduler on which reconnect retries
/// run.
pub struct RivuletAppContext {
    name: String,
    scheduler: Arc<dyn RetryScheduler>,
}

impl RivuletAppContext {
    pub fn new(name: impl Into<String>, scheduler: Arc<dyn RetryScheduler>) -> Self {
        Self {
            name: name.into(),
            scheduler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheduler(&self) -> &Arc<dyn RetryScheduler> {
        &self.scheduler
    }
}

impl fmt::Debug for RivuletAppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RivuletAppContext")
            .field("name", &self.name)
            .finish()
    }
}

/// Typed key/value accessor handed to backends at `init`. The core never
/// interprets its contents; each backend reads the keys it documents.
#[derive(Clone, Debug, Default)]
pub struct ConfigReader {
    properties: HashMap<String, String>,
}

impl ConfigReader {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn read_string(&self, key: &str, default: &str) -> String {
        self.properties
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    pub fn read_i64(&self, key: &str, default: i64) -> i64 {
        self.properties
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn read_bool(&self, key: &str, default: bool) -> bool {
        self.properties
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}
