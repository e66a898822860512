//! Approval-flag transitions reported by entity updates.

use serde::Serialize;

use crate::types::DbId;

pub const EVENT_RECORD_APPROVED: &str = "record.approved";
pub const EVENT_RECORD_UNAPPROVED: &str = "record.unapproved";

/// An approval column changed value during an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub entity: &'static str,
    pub id: DbId,
    pub column: &'static str,
    pub from: bool,
    pub to: bool,
}

impl StatusTransition {
    /// Compare the flag before and after an update. `NULL` counts as `false`.
    pub fn detect(
        entity: &'static str,
        id: DbId,
        column: &'static str,
        before: Option<bool>,
        after: Option<bool>,
    ) -> Option<Self> {
        let (from, to) = (before.unwrap_or(false), after.unwrap_or(false));
        (from != to).then_some(Self {
            entity,
            id,
            column,
            from,
            to,
        })
    }

    pub fn event_type(&self) -> &'static str {
        if self.to {
            EVENT_RECORD_APPROVED
        } else {
            EVENT_RECORD_UNAPPROVED
        }
    }
}
