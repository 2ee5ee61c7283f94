use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Caller;

/// A pending handoff of a booking from sender to receiver. The record only
/// exists while the handoff is in flight: completion and rejection both
/// remove it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub booking_id: Uuid,
    pub receiver_approval: bool,
    pub admin_approval: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub receiver_id: Uuid,
    pub booking_id: Uuid,
}

/// Manual patch, bypassing the approval semantics. Restricted to the
/// sender and administrators.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferPatch {
    pub receiver_id: Option<Uuid>,
    pub receiver_approval: Option<bool>,
    pub admin_approval: Option<bool>,
}

/// Body of the approval endpoint. Any value other than the literal
/// "Approved" counts as a rejection.
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approval: String,
}

impl ApprovalRequest {
    pub fn is_approved(&self) -> bool {
        self.approval == "Approved"
    }
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub booking_id: Uuid,
}

/// Which of the two required approval slots a caller fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalRole {
    Receiver,
    Admin,
}

impl ApprovalRole {
    /// Attributes the caller to exactly one approval slot. The receiver
    /// always approves as receiver, even when they also hold the admin
    /// role; anyone else must be an administrator. Callers who are
    /// neither get no slot.
    pub fn attribute(caller: &Caller, transfer: &Transfer) -> Option<ApprovalRole> {
        if caller.id == transfer.receiver_id {
            Some(ApprovalRole::Receiver)
        } else if caller.is_admin() {
            Some(ApprovalRole::Admin)
        } else {
            None
        }
    }
}

/// The approval still outstanding on a pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingApproval {
    Receiver,
    Admin,
}

impl fmt::Display for PendingApproval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingApproval::Receiver => write!(f, "receiver"),
            PendingApproval::Admin => write!(f, "admin"),
        }
    }
}

/// Where a transfer stands after an approval has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalProgress {
    /// Both flags set; ownership reassignment is due.
    Ready,
    /// Still waiting on the named approval.
    Waiting(PendingApproval),
}

impl Transfer {
    pub fn with_approval(mut self, role: ApprovalRole) -> Transfer {
        match role {
            ApprovalRole::Receiver => self.receiver_approval = true,
            ApprovalRole::Admin => self.admin_approval = true,
        }
        self
    }

    pub fn progress(&self) -> ApprovalProgress {
        if self.receiver_approval && self.admin_approval {
            ApprovalProgress::Ready
        } else if self.admin_approval {
            ApprovalProgress::Waiting(PendingApproval::Receiver)
        } else {
            ApprovalProgress::Waiting(PendingApproval::Admin)
        }
    }
}
