//! Simulated usage accrued by each step of a crew run.
//!
//! The orchestrator adds one [`Accrual`] per completed step, so the final
//! `tokens_used` / `api_calls` of an execution is the sum over its steps.

/// Token and API-call usage added by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accrual {
    pub tokens: i64,
    pub api_calls: i64,
}

impl Accrual {
    /// A step that costs nothing (plain log lines).
    pub const NONE: Accrual = Accrual {
        tokens: 0,
        api_calls: 0,
    };

    /// Initializing one agent.
    pub const AGENT_STEP: Accrual = Accrual {
        tokens: 1500,
        api_calls: 3,
    };

    /// Processing one task.
    pub const TASK_STEP: Accrual = Accrual {
        tokens: 2000,
        api_calls: 5,
    };

    /// Synthesizing the final report.
    pub const REPORT_STEP: Accrual = Accrual {
        tokens: 3000,
        api_calls: 8,
    };
}
