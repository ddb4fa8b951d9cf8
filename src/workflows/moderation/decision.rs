use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ModerationAction;

/// An admin's verdict on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationDecision {
    Approve,
    Reject,
    RequestRevision,
}

impl ModerationDecision {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationDecision::Approve => "APPROVE",
            ModerationDecision::Reject => "REJECT",
            ModerationDecision::RequestRevision => "REQUEST_REVISION",
        }
    }

    pub const fn action(self) -> ModerationAction {
        match self {
            ModerationDecision::Approve => ModerationAction::Approve,
            ModerationDecision::Reject => ModerationAction::Reject,
            ModerationDecision::RequestRevision => ModerationAction::RequestRevision,
        }
    }
}

/// Raised when a decision request carries neither a recognizable `decision`
/// value nor the legacy `verified` flag.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized moderation decision '{}'", .raw.as_deref().unwrap_or("<empty>"))]
pub struct InvalidDecisionError {
    pub raw: Option<String>,
}

/// Wire shape accepted by the decide endpoint. Carries both the current
/// decision-based fields and the deprecated `verified`/`reason` pair so old
/// admin clients keep working.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionRequest {
    // Legacy fields (backward compat).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    // Current moderation fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_action_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_action_deadline_at: Option<DateTime<Utc>>,
}

/// The single internal form every decision request normalizes into. All
/// business rules branch on this, never on which wire shape was used.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionCommand {
    pub decision: ModerationDecision,
    pub reason_code: Option<String>,
    pub reason_text: Option<String>,
    pub owner_action_required: bool,
    pub owner_action_deadline_at: Option<DateTime<Utc>>,
}

impl DecisionRequest {
    /// True when the decision-based fields are populated.
    pub fn is_new_format(&self) -> bool {
        self.decision
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }

    /// Collapse both wire shapes into one `DecisionCommand`.
    ///
    /// Legacy mapping: `verified=true` becomes Approve, `verified=false`
    /// becomes Reject, the legacy `reason` becomes `reason_text`, and no
    /// reason code is carried. Reason strings are trimmed here and blank
    /// ones dropped, so every consumer (listing row, audit event,
    /// notification) sees the same text. A request with neither a decision
    /// nor the legacy flag has no meaning and is rejected here, before any
    /// state is touched.
    pub fn normalize(&self) -> Result<DecisionCommand, InvalidDecisionError> {
        if self.is_new_format() {
            let raw = self
                .decision
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_ascii_uppercase();
            let decision = match raw.as_str() {
                "APPROVE" => ModerationDecision::Approve,
                "REJECT" => ModerationDecision::Reject,
                "REQUEST_REVISION" => ModerationDecision::RequestRevision,
                _ => return Err(InvalidDecisionError { raw: Some(raw) }),
            };
            return Ok(DecisionCommand {
                decision,
                reason_code: self.reason_code.clone(),
                reason_text: clean(self.reason_text.as_deref()),
                owner_action_required: self.owner_action_required.unwrap_or(false),
                owner_action_deadline_at: self.owner_action_deadline_at,
            });
        }

        let decision = match self.verified {
            Some(true) => ModerationDecision::Approve,
            Some(false) => ModerationDecision::Reject,
            None => return Err(InvalidDecisionError { raw: None }),
        };

        Ok(DecisionCommand {
            decision,
            reason_code: None,
            reason_text: clean(self.reason.as_deref()),
            owner_action_required: self.owner_action_required.unwrap_or(false),
            owner_action_deadline_at: self.owner_action_deadline_at,
        })
    }
}

fn clean(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
