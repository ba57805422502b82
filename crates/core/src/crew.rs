//! Crew, agent and task validation rules.
//!
//! Pure functions used by the API layer before anything is written to the
//! record store.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a crew name.
pub const MAX_CREW_NAME_LEN: usize = 100;

/// Maximum length of a crew description.
pub const MAX_CREW_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a crew category.
pub const MAX_CREW_CATEGORY_LEN: usize = 50;

/// Accepted crew statuses.
pub const CREW_STATUSES: &[&str] = &["active", "inactive", "draft"];

/// Status given to crews created without one.
pub const DEFAULT_CREW_STATUS: &str = "active";

/// Accepted task priorities.
pub const TASK_PRIORITIES: &[&str] = &["low", "medium", "high"];

/// Priority given to tasks created without one.
pub const DEFAULT_TASK_PRIORITY: &str = "medium";

/// Output format given to tasks created without one.
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

/// Model assigned to agents created without one.
pub const DEFAULT_AGENT_MODEL: &str = "llama-4-maverick-17b-128e-instruct";

/// Iteration budget assigned to agents created without one.
pub const DEFAULT_MAX_ITERATIONS: i64 = 5;

/// Sampling temperature assigned to agents created without one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Upper bound for an agent's sampling temperature.
pub const MAX_TEMPERATURE: f64 = 2.0;

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

/// Validate a crew name: non-blank, at most [`MAX_CREW_NAME_LEN`] characters.
pub fn validate_crew_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Crew name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_CREW_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Crew name must not exceed {MAX_CREW_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate optional free-text crew fields.
pub fn validate_crew_details(
    description: Option<&str>,
    category: Option<&str>,
) -> Result<(), CoreError> {
    if description.is_some_and(|d| d.chars().count() > MAX_CREW_DESCRIPTION_LEN) {
        return Err(CoreError::Validation(format!(
            "Crew description must not exceed {MAX_CREW_DESCRIPTION_LEN} characters"
        )));
    }
    if category.is_some_and(|c| c.chars().count() > MAX_CREW_CATEGORY_LEN) {
        return Err(CoreError::Validation(format!(
            "Crew category must not exceed {MAX_CREW_CATEGORY_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a crew status against [`CREW_STATUSES`].
pub fn validate_crew_status(status: &str) -> Result<(), CoreError> {
    if CREW_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown crew status \"{status}\"; expected one of {}",
            CREW_STATUSES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Agents and tasks
// ---------------------------------------------------------------------------

fn require(field: &str, owner: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "{owner} {field} must not be empty"
        )));
    }
    Ok(())
}

/// Validate the required agent fields and its tuning parameters.
pub fn validate_agent(
    name: &str,
    role: &str,
    goal: &str,
    temperature: Option<f64>,
    max_iterations: Option<i64>,
) -> Result<(), CoreError> {
    require("name", "Agent", name)?;
    require("role", "Agent", role)?;
    require("goal", "Agent", goal)?;

    if let Some(t) = temperature {
        if !(0.0..=MAX_TEMPERATURE).contains(&t) {
            return Err(CoreError::Validation(format!(
                "Agent temperature must be between 0 and {MAX_TEMPERATURE}"
            )));
        }
    }
    if max_iterations.is_some_and(|n| n < 1) {
        return Err(CoreError::Validation(
            "Agent max_iterations must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate the required task fields and its priority.
pub fn validate_task(
    name: &str,
    description: &str,
    expected_output: &str,
    priority: Option<&str>,
) -> Result<(), CoreError> {
    require("name", "Task", name)?;
    require("description", "Task", description)?;
    require("expected_output", "Task", expected_output)?;

    if let Some(p) = priority {
        if !TASK_PRIORITIES.contains(&p) {
            return Err(CoreError::Validation(format!(
                "Unknown task priority \"{p}\"; expected one of {}",
                TASK_PRIORITIES.join(", ")
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn crew_name_rules() {
        assert!(validate_crew_name("Research Crew").is_ok());
        assert_matches!(validate_crew_name("   "), Err(CoreError::Validation(_)));
        let long = "x".repeat(MAX_CREW_NAME_LEN + 1);
        assert_matches!(validate_crew_name(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn crew_details_limits() {
        assert!(validate_crew_details(None, None).is_ok());
        assert!(validate_crew_details(Some("short"), Some("research")).is_ok());
        let long = "d".repeat(MAX_CREW_DESCRIPTION_LEN + 1);
        assert!(validate_crew_details(Some(&long), None).is_err());
        let cat = "c".repeat(MAX_CREW_CATEGORY_LEN + 1);
        assert!(validate_crew_details(None, Some(&cat)).is_err());
    }

    #[test]
    fn crew_status_must_be_known() {
        for status in CREW_STATUSES {
            assert!(validate_crew_status(status).is_ok());
        }
        assert_matches!(
            validate_crew_status("archived"),
            Err(CoreError::Validation(msg)) if msg.contains("archived")
        );
    }

    #[test]
    fn agent_requires_name_role_goal() {
        assert!(validate_agent("Ana", "Researcher", "Find sources", None, None).is_ok());
        assert!(validate_agent("", "Researcher", "Find sources", None, None).is_err());
        assert!(validate_agent("Ana", " ", "Find sources", None, None).is_err());
        assert!(validate_agent("Ana", "Researcher", "", None, None).is_err());
    }

    #[test]
    fn agent_temperature_and_iterations_bounds() {
        assert!(validate_agent("a", "b", "c", Some(0.0), Some(1)).is_ok());
        assert!(validate_agent("a", "b", "c", Some(MAX_TEMPERATURE), None).is_ok());
        assert!(validate_agent("a", "b", "c", Some(2.5), None).is_err());
        assert!(validate_agent("a", "b", "c", Some(-0.1), None).is_err());
        assert!(validate_agent("a", "b", "c", None, Some(0)).is_err());
    }

    #[test]
    fn task_rules() {
        assert!(validate_task("Write", "Write it", "A draft", Some("high")).is_ok());
        assert!(validate_task("Write", "Write it", "A draft", None).is_ok());
        assert!(validate_task("", "Write it", "A draft", None).is_err());
        assert!(validate_task("Write", "Write it", "A draft", Some("urgent")).is_err());
    }
}
