//! Drives one execution from `pending` to a terminal state.
//!
//! [`supervise`] runs the step sequence on its own task and watches it: a
//! step that returns an error or a panic anywhere in the run becomes a
//! `failed` transition instead of escaping to the runtime.
//!
//! Cancellation is observed at checkpoints. A simulated pause is never cut
//! short; the next transition attempt finds the execution cancelled and the
//! run stops without emitting anything further.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crewboard_core::accrual::Accrual;
use crewboard_core::execution::{ExecutionStatus, LogSeverity};
use crewboard_db::models::agent::Agent;
use crewboard_db::models::crew::Crew;
use crewboard_db::models::task::Task;
use tokio::sync::Mutex;

use crate::config::SimulationConfig;
use crate::engine::machine::{ExecutionMachine, TransitionError};
use crate::engine::report::{ReportContext, ReportGenerator};

/// An execution machine shared between its run and cancel requests.
pub type SharedMachine = Arc<Mutex<ExecutionMachine>>;

/// Everything one run needs, captured when the execution is started.
pub struct ExecutionRun {
    pub machine: SharedMachine,
    pub crew: Crew,
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub reports: Arc<dyn ReportGenerator>,
    pub pacing: SimulationConfig,
}

/// One planned step of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Log {
        message: String,
        severity: LogSeverity,
        accrual: Accrual,
    },
    Pause(Duration),
}

impl Step {
    fn info(message: String) -> Self {
        Step::Log {
            message,
            severity: LogSeverity::Info,
            accrual: Accrual::NONE,
        }
    }

    fn success(message: String, accrual: Accrual) -> Self {
        Step::Log {
            message,
            severity: LogSeverity::Success,
            accrual,
        }
    }
}

/// The step sequence for a crew: agents first, then tasks, then the report
/// pause. Usage is accrued on the step that reports the work as done.
pub fn plan(crew: &Crew, agents: &[Agent], tasks: &[Task], pacing: &SimulationConfig) -> Vec<Step> {
    let mut steps = Vec::with_capacity(2 + 3 * (agents.len() + tasks.len()) + 1);
    steps.push(Step::info(format!("Starting execution of crew: {}", crew.name)));

    for agent in agents {
        steps.push(Step::info(format!(
            "Initializing agent: {} ({})",
            agent.name, agent.role
        )));
        steps.push(Step::Pause(pacing.agent_step()));
        steps.push(Step::success(
            format!("Agent {} initialized successfully", agent.name),
            Accrual::AGENT_STEP,
        ));
    }

    for task in tasks {
        steps.push(Step::info(format!("Processing task: {}", task.name)));
        steps.push(Step::Pause(pacing.task_step()));
        steps.push(Step::success(
            format!("Task '{}' completed successfully", task.name),
            Accrual::TASK_STEP,
        ));
    }

    steps.push(Step::info("Generating final results and report".to_string()));
    steps.push(Step::Pause(pacing.report_step()));
    steps
}

/// Run an execution to completion and convert any fault into `failed`.
pub async fn supervise(run: ExecutionRun) {
    let machine = Arc::clone(&run.machine);
    let execution_id = machine.lock().await.id().to_string();

    let fault = match tokio::spawn(drive(run)).await {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e.to_string(),
        Err(join) if join.is_panic() => {
            format!("Execution panicked: {}", panic_message(join.into_panic()))
        }
        Err(join) => format!("Execution task ended unexpectedly: {join}"),
    };

    let mut m = machine.lock().await;
    if m.status().is_terminal() {
        tracing::debug!(
            execution_id = %execution_id,
            status = %m.status(),
            error = %fault,
            "Fault after terminal state ignored",
        );
        return;
    }

    tracing::error!(execution_id = %execution_id, error = %fault, "Execution failed");
    if let Err(e) = m.fail(&fault).await {
        tracing::error!(execution_id = %execution_id, error = %e, "Could not mark execution failed");
    }
}

/// The step sequence. `Ok(())` covers both completion and a cancellation
/// observed at a checkpoint.
async fn drive(run: ExecutionRun) -> Result<(), TransitionError> {
    let ExecutionRun {
        machine,
        crew,
        agents,
        tasks,
        reports,
        pacing,
    } = run;

    {
        let mut m = machine.lock().await;
        if let Err(e) = m.begin().await {
            return stop_or_fault(&m, e);
        }
        tracing::info!(
            execution_id = %m.id(),
            crew_id = %crew.id,
            agents = agents.len(),
            tasks = tasks.len(),
            "Execution started",
        );
    }

    for step in plan(&crew, &agents, &tasks, &pacing) {
        match step {
            Step::Pause(duration) => tokio::time::sleep(duration).await,
            Step::Log {
                message,
                severity,
                accrual,
            } => {
                let mut m = machine.lock().await;
                if let Err(e) = m.progress(message, severity, accrual).await {
                    return stop_or_fault(&m, e);
                }
            }
        }
    }

    let mut m = machine.lock().await;
    if m.status() == ExecutionStatus::Cancelled {
        return Ok(());
    }
    let execution = m.execution();
    let finished_at = chrono::Utc::now();
    let result = reports.generate(&ReportContext {
        crew: &crew,
        agents: &agents,
        tasks: &tasks,
        started_at: execution.started_at,
        finished_at,
        tokens_used: execution.tokens_used + Accrual::REPORT_STEP.tokens,
        api_calls: execution.api_calls + Accrual::REPORT_STEP.api_calls,
    });
    if let Err(e) = m.complete(result, Accrual::REPORT_STEP, finished_at).await {
        return stop_or_fault(&m, e);
    }

    let done = m.execution();
    tracing::info!(
        execution_id = %done.id,
        duration_ms = done.duration.unwrap_or_default(),
        tokens_used = done.tokens_used,
        api_calls = done.api_calls,
        "Execution completed",
    );
    Ok(())
}

/// A rejected transition on a cancelled execution is the cancellation
/// checkpoint; anything else is a fault.
fn stop_or_fault(machine: &ExecutionMachine, err: TransitionError) -> Result<(), TransitionError> {
    if machine.status() == ExecutionStatus::Cancelled {
        tracing::debug!(execution_id = %machine.id(), "Run stopped at cancellation checkpoint");
        Ok(())
    } else {
        Err(err)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn crew() -> Crew {
        let now = Utc::now();
        Crew {
            id: "crew-1".into(),
            name: "Alpha".into(),
            description: None,
            status: "active".into(),
            category: None,
            rating: 0,
            featured: false,
            executions: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn agent(name: &str) -> Agent {
        let now = Utc::now();
        Agent {
            id: format!("agent-{name}"),
            crew_id: "crew-1".into(),
            name: name.into(),
            role: "Researcher".into(),
            goal: "Find".into(),
            backstory: None,
            tools: vec![],
            max_iterations: 5,
            temperature: 0.7,
            model: "m".into(),
            status: "active".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn task(name: &str) -> Task {
        let now = Utc::now();
        Task {
            id: format!("task-{name}"),
            crew_id: "crew-1".into(),
            name: name.into(),
            description: "Do it".into(),
            expected_output: "Done".into(),
            assigned_agent: None,
            priority: "medium".into(),
            context: None,
            output_format: "text".into(),
            status: "pending".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn logs(steps: &[Step]) -> Vec<(&str, LogSeverity)> {
        steps
            .iter()
            .filter_map(|s| match s {
                Step::Log {
                    message, severity, ..
                } => Some((message.as_str(), *severity)),
                Step::Pause(_) => None,
            })
            .collect()
    }

    #[test]
    fn plan_walks_agents_then_tasks() {
        let steps = plan(
            &crew(),
            &[agent("Ana"), agent("Ben")],
            &[task("Summarize")],
            &SimulationConfig::fixed(1),
        );

        assert_eq!(
            logs(&steps),
            vec![
                ("Starting execution of crew: Alpha", LogSeverity::Info),
                ("Initializing agent: Ana (Researcher)", LogSeverity::Info),
                ("Agent Ana initialized successfully", LogSeverity::Success),
                ("Initializing agent: Ben (Researcher)", LogSeverity::Info),
                ("Agent Ben initialized successfully", LogSeverity::Success),
                ("Processing task: Summarize", LogSeverity::Info),
                ("Task 'Summarize' completed successfully", LogSeverity::Success),
                ("Generating final results and report", LogSeverity::Info),
            ]
        );
        assert_eq!(steps.last(), Some(&Step::Pause(Duration::from_millis(1))));
    }

    #[test]
    fn plan_accrues_on_completion_steps() {
        let steps = plan(
            &crew(),
            &[agent("Ana"), agent("Ben")],
            &[task("Summarize")],
            &SimulationConfig::fixed(1),
        );
        let total = steps.iter().fold(Accrual::NONE, |acc, s| match s {
            Step::Log { accrual, .. } => Accrual {
                tokens: acc.tokens + accrual.tokens,
                api_calls: acc.api_calls + accrual.api_calls,
            },
            Step::Pause(_) => acc,
        });
        // The report step's usage is added on completion.
        assert_eq!(total.tokens + Accrual::REPORT_STEP.tokens, 8000);
        assert_eq!(total.api_calls + Accrual::REPORT_STEP.api_calls, 19);
    }

    #[test]
    fn empty_crew_still_reports() {
        let steps = plan(&crew(), &[], &[], &SimulationConfig::fixed(0));
        assert_eq!(logs(&steps).len(), 2);
    }

    #[test]
    fn panic_payloads_are_readable() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic");
    }
}
