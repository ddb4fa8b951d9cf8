use serde::{Deserialize, Serialize};

use super::decision::ModerationDecision;

/// Fully built message handed to the delivery collaborator. The workflow
/// never inspects delivery outcomes beyond success/failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Outbound delivery hook (e-mail, SMS, push). Implementations may fail
/// however they like; the workflow treats every failure identically.
pub trait NotificationGateway: Send + Sync {
    fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Delivery error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

pub(crate) fn decision_notice(
    recipient: String,
    listing_title: &str,
    decision: ModerationDecision,
    reason_text: Option<&str>,
) -> Notification {
    match decision {
        ModerationDecision::Approve => Notification {
            recipient,
            subject: "Your listing has been approved - SmartRent".to_string(),
            body: format!(
                "Great news! Your listing \"{listing_title}\" has been approved and is now visible to the public."
            ),
        },
        ModerationDecision::Reject => Notification {
            recipient,
            subject: "Your listing has been rejected - SmartRent".to_string(),
            body: with_reason(
                format!("Unfortunately, your listing \"{listing_title}\" has been rejected."),
                "Reason",
                reason_text,
                "Please update the listing and resubmit it for review.",
            ),
        },
        ModerationDecision::RequestRevision => Notification {
            recipient,
            subject: "Revision required for your listing - SmartRent".to_string(),
            body: with_reason(
                format!(
                    "Your listing \"{listing_title}\" needs some updates before it can be approved."
                ),
                "What to update",
                reason_text,
                "Please edit the listing and resubmit it for review when you're done.",
            ),
        },
    }
}

pub(crate) fn report_action_notice(
    recipient: String,
    listing_title: &str,
    admin_notes: Option<&str>,
) -> Notification {
    Notification {
        recipient,
        subject: "Action required for your listing - SmartRent".to_string(),
        body: with_reason(
            format!(
                "A report on your listing \"{listing_title}\" has been reviewed and requires your action."
            ),
            "Admin notes",
            admin_notes,
            "Please update the listing and resubmit it for review.",
        ),
    }
}

pub(crate) fn resubmitted_notice(recipient: String, listing_title: &str) -> Notification {
    Notification {
        recipient,
        subject: "Listing resubmitted for review - SmartRent".to_string(),
        body: format!("Listing \"{listing_title}\" was corrected by its owner and needs re-review."),
    }
}

fn with_reason(
    intro: String,
    reason_heading: &str,
    reason: Option<&str>,
    closing: &str,
) -> String {
    match reason.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => format!("{intro}\n\n{reason_heading}: {text}\n\n{closing}"),
        None => format!("{intro}\n\n{closing}"),
    }
}
