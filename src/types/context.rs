//! Per-request logging context
//!
//! Each generation request carries its own `tracing` span, handed explicitly
//! to every component call instead of living in process-global state.

use tracing::{Span, info_span};

use super::preferences::Preferences;

/// Identity and logging span of one generation request
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    span: Span,
}

impl RequestContext {
    pub fn new() -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("generation", request_id = %request_id);
        Self { request_id, span }
    }

    /// Context whose span records a summary of the user's preferences
    pub fn for_preferences(preferences: &Preferences) -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!(
            "generation",
            request_id = %request_id,
            skills = preferences.skills.len(),
            budget_max = preferences.budget_range.max(),
            risk_tolerance = %preferences.risk_tolerance,
        );
        Self { request_id, span }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
