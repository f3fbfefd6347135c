//! Student clearance workflow: term rounds, enrollments, and the
//! per-program signature state machine.

pub mod domain;
pub mod enrollment;
pub mod engine;
pub mod files;
pub mod memory;
pub mod registry;
pub mod repository;
pub mod rounds;
pub mod router;
pub mod views;

#[cfg(test)]
mod tests;

/// Error raised by the clearance services. `Conflict` travels inside the
/// repository variant; the router maps each case to its own status code.
#[derive(Debug, thiserror::Error)]
pub enum ClearanceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<files::UnsupportedImage> for ClearanceError {
    fn from(err: files::UnsupportedImage) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Parse a wire status label, rejecting anything outside the allowed set.
pub(crate) fn parse_status(raw: &str) -> Result<ClearanceStatus, ClearanceError> {
    ClearanceStatus::from_label(raw).ok_or_else(|| {
        ClearanceError::InvalidArgument(format!(
            "invalid status '{raw}'; expected Approved, Pending, or Rejected"
        ))
    })
}

pub use domain::{
    ClearanceRound, ClearanceSignature, ClearanceStatus, EnrollmentId, Notification,
    NotificationId, Program, ProgramId, RoundId, SignatureRecordId, StaffSignature,
    StaffSignatureId, StudentClearance, StudentProfile, UserAccount, UserId,
};
pub use enrollment::EnrollmentTracker;
pub use engine::{NewSignatureRequest, ReceiptUpdate, SignatureWorkflowEngine};
pub use files::{FileUpload, StoredFile};
pub use registry::StaffSignatureDesk;
pub use repository::{
    ClearanceStore, IdentityStore, NewEnrollment, NewRound, NewSignatureRecord, NewStaffSignature,
    NotificationLog, ProgramCatalog, ReceiptVault, RepositoryError, SignatureRegistry,
};
pub use rounds::RoundRegistry;
pub use router::{clearance_router, ClearanceApp};
