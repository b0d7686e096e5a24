//! Output formatter trait

use supervisor_domain::SessionOutcome;

/// Trait for formatting session outcomes
pub trait OutputFormatter {
    /// Format the complete outcome with round history
    fn format(&self, outcome: &SessionOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &SessionOutcome) -> String;
}
