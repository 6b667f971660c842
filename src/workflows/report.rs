//! The terminal step: a pure projection of the final state into a report.

use super::state::ReconState;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Substituted for every registered field that no task wrote.
pub const PLACEHOLDER: &str = "Data not available or errored out.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    /// Stable section key, e.g. `Web_Reconnaissance`.
    pub title: String,
    pub content: String,
}

/// Compiled reconnaissance report.
///
/// Serializes as a single JSON object with keys in a fixed order:
/// `Target`, each section, then `Errors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub target: String,
    pub sections: Vec<ReportSection>,
    pub errors: Vec<String>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.content.as_str())
    }

    /// Sections that carry real data rather than the placeholder.
    pub fn populated_sections(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.content != PLACEHOLDER)
            .count()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + 2))?;
        map.serialize_entry("Target", &self.target)?;
        for section in &self.sections {
            map.serialize_entry(&section.title, &section.content)?;
        }
        map.serialize_entry("Errors", &self.errors)?;
        map.end()
    }
}

pub struct ReportCompiler;

impl ReportCompiler {
    /// Build the report from the state. Reads only registered fields, never fails.
    pub fn compile(state: &ReconState) -> Report {
        let sections = state
            .registered_fields()
            .into_iter()
            .map(|field| ReportSection {
                title: field.section_label().to_string(),
                content: state.value(field).unwrap_or(PLACEHOLDER).to_string(),
            })
            .collect();

        Report {
            target: state.target().as_str().to_string(),
            sections,
            errors: state.errors().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reducer::Reducer;
    use crate::workflows::state::StateField;
    use crate::workflows::target::Target;
    use crate::workflows::task::TaskOutcome;

    fn scenario_state() -> ReconState {
        let mut state = ReconState::new(
            Target::parse("example.com").unwrap(),
            &[
                StateField::WebRecon,
                StateField::Osint,
                StateField::VulnerabilityScan,
            ],
        );
        Reducer::fold(
            &mut state,
            vec![
                TaskOutcome::written("web", StateField::WebRecon, "tech: nginx"),
                TaskOutcome::failed("osint", StateField::Osint, "dns timeout"),
                TaskOutcome::written("vuln", StateField::VulnerabilityScan, "no open ports"),
            ],
        )
        .unwrap();
        state
    }

    #[test]
    fn test_compile_substitutes_placeholder() {
        let report = ReportCompiler::compile(&scenario_state());

        assert_eq!(report.target, "example.com");
        assert_eq!(report.section("Web_Reconnaissance"), Some("tech: nginx"));
        assert_eq!(report.section("OSINT_Intelligence"), Some(PLACEHOLDER));
        assert_eq!(
            report.section("Vulnerability_Assessment"),
            Some("no open ports")
        );
        assert_eq!(report.section("Subdomain_Reconnaissance"), None);
        assert_eq!(report.errors, ["OSINT Error: dns timeout"]);
        assert_eq!(report.populated_sections(), 2);
    }

    #[test]
    fn test_json_key_order() {
        let report = ReportCompiler::compile(&scenario_state());
        let json = serde_json::to_string(&report).unwrap();

        assert_eq!(
            json,
            r#"{"Target":"example.com","Web_Reconnaissance":"tech: nginx","OSINT_Intelligence":"Data not available or errored out.","Vulnerability_Assessment":"no open ports","Errors":["OSINT Error: dns timeout"]}"#
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let state = scenario_state();
        let first = ReportCompiler::compile(&state).to_json_pretty().unwrap();
        let second = ReportCompiler::compile(&state).to_json_pretty().unwrap();
        assert_eq!(first, second);
    }
}
