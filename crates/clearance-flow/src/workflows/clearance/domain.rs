use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::files::StoredFile;

/// Identifier for a user account (students and staff share the account space).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

/// Identifier for a catalog program requiring sign-off.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProgramId(pub u64);

/// Identifier for a clearance round (one per term in normal use).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoundId(pub u64);

/// Identifier for a student's enrollment into a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnrollmentId(pub u64);

/// Identifier for a per-program signature record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SignatureRecordId(pub u64);

/// Identifier for a staff member's on-file signature image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StaffSignatureId(pub u64);

/// Identifier for a notification entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NotificationId(pub u64);

/// Status shared by enrollments and signature records. The two are tracked
/// independently; updating one never cascades into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClearanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClearanceStatus::Pending => "Pending",
            ClearanceStatus::Approved => "Approved",
            ClearanceStatus::Rejected => "Rejected",
        }
    }

    /// Exact-match parse of the wire labels. Anything else is invalid.
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(ClearanceStatus::Pending),
            "Approved" => Some(ClearanceStatus::Approved),
            "Rejected" => Some(ClearanceStatus::Rejected),
            _ => None,
        }
    }
}

/// Catalog entry for a program that participates in clearance rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// Account data surfaced by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

/// Student profile attributes consumed read-only by the filter query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user: UserId,
    pub year_level: String,
    pub major: String,
}

/// A clearance term instance covering a fixed program set captured at
/// creation. Programs added to the catalog afterwards never join an existing
/// round; they appear in the next round created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceRound {
    pub id: RoundId,
    pub programs: Vec<ProgramId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub semester: String,
    pub academic_year: String,
}

/// A student's participation record in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentClearance {
    pub id: EnrollmentId,
    pub student: UserId,
    pub round: RoundId,
    pub status: ClearanceStatus,
}

/// Per-program approval unit within an enrollment. This is the record the
/// workflow engine manipulates. It carries no timestamps; id ordering is the
/// recency proxy (ids are assigned in insertion order by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceSignature {
    pub id: SignatureRecordId,
    pub student: UserId,
    pub enrollment: EnrollmentId,
    pub program: ProgramId,
    pub receipt: Option<StoredFile>,
    pub staff_signature: Option<StaffSignatureId>,
    pub status: ClearanceStatus,
    pub feedback: String,
}

/// The on-file image representing a staff member's sign-off. At most one per
/// staff member; replacing it deletes the prior image and record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSignature {
    pub id: StaffSignatureId,
    pub staff: UserId,
    pub image: Option<StoredFile>,
    pub description: String,
}

/// Append-only per-user message. Delivery is someone else's problem; only the
/// data shape lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user: UserId,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
