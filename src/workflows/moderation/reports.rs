use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a content report, as decided by the report workflow. The
/// moderation core only sees reports after resolution; this command tells it
/// which corrective side effects to apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportResolution {
    #[serde(default)]
    pub owner_action_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_visibility_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_action_deadline_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl ReportResolution {
    /// Whether the resolution asks for the listing to be pulled from public
    /// view until the owner corrects it. Matching is case-insensitive; any
    /// other value leaves visibility untouched.
    pub fn hides_listing(&self) -> bool {
        self.listing_visibility_action
            .as_deref()
            .is_some_and(|action| action.trim().eq_ignore_ascii_case("HIDE_UNTIL_REVIEW"))
    }
}
