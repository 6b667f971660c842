//! Folds task outcomes into [`ReconState`].
//!
//! | Outcome   | Action                                              |
//! |-----------|-----------------------------------------------------|
//! | `Written` | fill the owned slot; violation if already filled    |
//! | `Failed`  | append the message to `errors`; slot stays unset    |

use super::state::{ReconState, Slot};
use super::task::TaskOutcome;
use crate::types::{AppError, Result};

pub struct Reducer;

impl Reducer {
    pub fn apply(state: &mut ReconState, outcome: TaskOutcome) -> Result<()> {
        match outcome {
            TaskOutcome::Written { task, field, value } => {
                let slot = state.slot_mut(field);
                match *slot {
                    Slot::Unregistered => Err(AppError::ContractViolation(format!(
                        "task '{}' wrote unregistered field '{}'",
                        task, field
                    ))),
                    Slot::Filled(_) => Err(AppError::ContractViolation(format!(
                        "task '{}' wrote field '{}' which was already set",
                        task, field
                    ))),
                    Slot::Empty => {
                        *slot = Slot::Filled(value);
                        Ok(())
                    }
                }
            }
            TaskOutcome::Failed {
                task,
                field,
                message,
            } => {
                if !state.slot(field).is_registered() {
                    return Err(AppError::ContractViolation(format!(
                        "task '{}' reported a failure for unregistered field '{}'",
                        task, field
                    )));
                }
                state.push_error(message);
                Ok(())
            }
        }
    }

    /// Apply every outcome in order, stopping at the first contract violation.
    pub fn fold<I>(state: &mut ReconState, outcomes: I) -> Result<()>
    where
        I: IntoIterator<Item = TaskOutcome>,
    {
        for outcome in outcomes {
            Self::apply(state, outcome)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::state::StateField;
    use crate::workflows::target::Target;

    fn state(fields: &[StateField]) -> ReconState {
        ReconState::new(Target::parse("example.com").unwrap(), fields)
    }

    #[test]
    fn test_written_fills_slot() {
        let mut state = state(&[StateField::WebRecon]);
        Reducer::apply(
            &mut state,
            TaskOutcome::written("web", StateField::WebRecon, "tech: nginx"),
        )
        .unwrap();

        assert_eq!(state.web_recon_results(), Some("tech: nginx"));
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_failed_appends_error_and_leaves_slot_unset() {
        let mut state = state(&[StateField::Osint]);
        Reducer::apply(
            &mut state,
            TaskOutcome::failed("osint", StateField::Osint, "dns timeout"),
        )
        .unwrap();

        assert_eq!(state.slot(StateField::Osint), &Slot::Empty);
        assert_eq!(state.errors(), ["OSINT Error: dns timeout"]);
    }

    #[test]
    fn test_double_write_is_contract_violation() {
        let mut state = state(&[StateField::WebRecon]);
        Reducer::apply(
            &mut state,
            TaskOutcome::written("web", StateField::WebRecon, "first"),
        )
        .unwrap();

        let err = Reducer::apply(
            &mut state,
            TaskOutcome::written("web_again", StateField::WebRecon, "second"),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::ContractViolation(_)));
        // The first value is never overwritten.
        assert_eq!(state.web_recon_results(), Some("first"));
    }

    #[test]
    fn test_write_to_unregistered_field_is_contract_violation() {
        let mut state = state(&[StateField::WebRecon]);
        let err = Reducer::apply(
            &mut state,
            TaskOutcome::written("vuln", StateField::VulnerabilityScan, "22/tcp open"),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::ContractViolation(_)));
        assert_eq!(
            state.slot(StateField::VulnerabilityScan),
            &Slot::Unregistered
        );
    }

    #[test]
    fn test_fold_preserves_error_order() {
        let mut state = state(&[
            StateField::WebRecon,
            StateField::Osint,
            StateField::VulnerabilityScan,
        ]);
        Reducer::fold(
            &mut state,
            vec![
                TaskOutcome::failed("vuln", StateField::VulnerabilityScan, "nmap missing"),
                TaskOutcome::written("web", StateField::WebRecon, "ok"),
                TaskOutcome::failed("osint", StateField::Osint, "dns timeout"),
            ],
        )
        .unwrap();

        assert_eq!(
            state.errors(),
            [
                "Vulnerability Scan Error: nmap missing",
                "OSINT Error: dns timeout"
            ]
        );
    }
}
