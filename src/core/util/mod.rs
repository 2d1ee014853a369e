// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod backoff_retry_counter;
pub mod parser;
pub mod scheduler;

pub use backoff_retry_counter::BackoffRetryCounter;
