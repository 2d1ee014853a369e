// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expression executors: the pre-compiled, allocation-light evaluation trees
//! that conditions and update-set assignments run on every event arrival.

pub mod condition;
pub mod constant_expression_executor;
pub mod expression_executor;
pub mod math;
pub mod variable_expression_executor;

pub use constant_expression_executor::ConstantExpressionExecutor;
pub use expression_executor::ExpressionExecutor;
pub use variable_expression_executor::{VariableExpressionExecutor, VariablePosition};
