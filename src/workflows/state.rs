//! Aggregate state for a single reconnaissance run.
//!
//! [`ReconState`] is a fixed struct with one named slot per task output plus
//! an append-only error list. Slots are written at most once, and only by the
//! [`Reducer`](super::reducer::Reducer).

use super::report::Report;
use super::target::Target;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The output fields a task can own.
///
/// Declaration order is the section order of the compiled report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    WebRecon,
    Osint,
    SubdomainRecon,
    VulnerabilityScan,
}

impl StateField {
    pub const ALL: [StateField; 4] = [
        StateField::WebRecon,
        StateField::Osint,
        StateField::SubdomainRecon,
        StateField::VulnerabilityScan,
    ];

    /// Name of the state slot, e.g. `web_recon_results`.
    pub fn key(&self) -> &'static str {
        match self {
            StateField::WebRecon => "web_recon_results",
            StateField::Osint => "osint_results",
            StateField::SubdomainRecon => "subdomain_results",
            StateField::VulnerabilityScan => "vulnerability_results",
        }
    }

    /// Human-readable report section key.
    pub fn section_label(&self) -> &'static str {
        match self {
            StateField::WebRecon => "Web_Reconnaissance",
            StateField::Osint => "OSINT_Intelligence",
            StateField::SubdomainRecon => "Subdomain_Reconnaissance",
            StateField::VulnerabilityScan => "Vulnerability_Assessment",
        }
    }

    /// Prefix used in error messages: `"<label> Error: <reason>"`.
    pub fn error_label(&self) -> &'static str {
        match self {
            StateField::WebRecon => "Web Recon",
            StateField::Osint => "OSINT",
            StateField::SubdomainRecon => "Subdomain Recon",
            StateField::VulnerabilityScan => "Vulnerability Scan",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One value slot of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot {
    /// No task in this run owns the field.
    #[default]
    Unregistered,
    /// Owned by a task that has not (successfully) written it.
    Empty,
    Filled(String),
}

impl Slot {
    pub fn value(&self) -> Option<&str> {
        match self {
            Slot::Filled(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, Slot::Unregistered)
    }
}

#[derive(Debug, Clone)]
pub struct ReconState {
    target: Target,
    web_recon_results: Slot,
    osint_results: Slot,
    subdomain_results: Slot,
    vulnerability_results: Slot,
    errors: Vec<String>,
    final_report: Option<Report>,
}

impl ReconState {
    /// Fresh state with the given fields registered and every slot unset.
    pub fn new(target: Target, fields: &[StateField]) -> Self {
        let mut state = Self {
            target,
            web_recon_results: Slot::Unregistered,
            osint_results: Slot::Unregistered,
            subdomain_results: Slot::Unregistered,
            vulnerability_results: Slot::Unregistered,
            errors: Vec::new(),
            final_report: None,
        };
        for field in fields {
            *state.slot_mut(*field) = Slot::Empty;
        }
        state
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn slot(&self, field: StateField) -> &Slot {
        match field {
            StateField::WebRecon => &self.web_recon_results,
            StateField::Osint => &self.osint_results,
            StateField::SubdomainRecon => &self.subdomain_results,
            StateField::VulnerabilityScan => &self.vulnerability_results,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: StateField) -> &mut Slot {
        match field {
            StateField::WebRecon => &mut self.web_recon_results,
            StateField::Osint => &mut self.osint_results,
            StateField::SubdomainRecon => &mut self.subdomain_results,
            StateField::VulnerabilityScan => &mut self.vulnerability_results,
        }
    }

    pub fn value(&self, field: StateField) -> Option<&str> {
        self.slot(field).value()
    }

    pub fn web_recon_results(&self) -> Option<&str> {
        self.web_recon_results.value()
    }

    pub fn osint_results(&self) -> Option<&str> {
        self.osint_results.value()
    }

    pub fn subdomain_results(&self) -> Option<&str> {
        self.subdomain_results.value()
    }

    pub fn vulnerability_results(&self) -> Option<&str> {
        self.vulnerability_results.value()
    }

    /// Registered fields in report order.
    pub fn registered_fields(&self) -> Vec<StateField> {
        StateField::ALL
            .into_iter()
            .filter(|field| self.slot(*field).is_registered())
            .collect()
    }

    /// Failure messages in the order the failing tasks completed.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub(crate) fn push_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn final_report(&self) -> Option<&Report> {
        self.final_report.as_ref()
    }

    pub(crate) fn set_final_report(&mut self, report: Report) {
        self.final_report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::parse("example.com").unwrap()
    }

    #[test]
    fn test_new_registers_only_given_fields() {
        let state = ReconState::new(target(), &[StateField::WebRecon, StateField::Osint]);

        assert_eq!(state.slot(StateField::WebRecon), &Slot::Empty);
        assert_eq!(state.slot(StateField::Osint), &Slot::Empty);
        assert_eq!(state.slot(StateField::SubdomainRecon), &Slot::Unregistered);
        assert_eq!(state.slot(StateField::VulnerabilityScan), &Slot::Unregistered);
        assert!(state.errors().is_empty());
        assert!(state.final_report().is_none());
    }

    #[test]
    fn test_registered_fields_follow_report_order() {
        let state = ReconState::new(
            target(),
            &[StateField::VulnerabilityScan, StateField::WebRecon],
        );
        assert_eq!(
            state.registered_fields(),
            vec![StateField::WebRecon, StateField::VulnerabilityScan]
        );
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(StateField::Osint.key(), "osint_results");
        assert_eq!(StateField::Osint.section_label(), "OSINT_Intelligence");
        assert_eq!(StateField::Osint.error_label(), "OSINT");
        assert_eq!(
            StateField::VulnerabilityScan.section_label(),
            "Vulnerability_Assessment"
        );
        assert_eq!(StateField::SubdomainRecon.to_string(), "subdomain_results");
    }

    #[test]
    fn test_slot_value() {
        assert_eq!(Slot::Filled("x".into()).value(), Some("x"));
        assert_eq!(Slot::Empty.value(), None);
        assert!(!Slot::Unregistered.is_registered());
    }
}
