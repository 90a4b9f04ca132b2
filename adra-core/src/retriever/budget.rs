//! Per-subtask tool-call budget.

use serde::{Deserialize, Serialize};

/// Counts tool invocations for one sub-task retrieval.
///
/// Every primitive charges one call on entry, including calls that end up over budget.
/// A call is permitted while the running count stays within `max_calls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolBudget {
    max_calls: usize,
    used: usize,
}

impl ToolBudget {
    pub fn new(max_calls: usize) -> Self {
        Self { max_calls, used: 0 }
    }

    /// Charge one call. Returns `false` when the call exceeds the budget.
    pub fn charge(&mut self) -> bool {
        self.used += 1;
        let allowed = self.used <= self.max_calls;
        if !allowed {
            tracing::debug!(
                used = self.used,
                limit = self.max_calls,
                "Tool-call budget exhausted"
            );
        }
        allowed
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn limit(&self) -> usize {
        self.max_calls
    }

    pub fn remaining(&self) -> usize {
        self.max_calls.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max_calls
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}
