use chrono::{DateTime, Utc};

use super::domain::{
    ClearanceRound, ClearanceSignature, ClearanceStatus, EnrollmentId, Notification, Program,
    ProgramId, RoundId, SignatureRecordId, StaffSignature, StaffSignatureId, StudentClearance,
    StudentProfile, UserAccount, UserId,
};
use super::files::{FileUpload, StoredFile};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Round payload before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewRound {
    pub programs: Vec<ProgramId>,
    pub semester: String,
    pub academic_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment payload before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub student: UserId,
    pub round: RoundId,
    pub status: ClearanceStatus,
}

/// Signature record payload before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewSignatureRecord {
    pub student: UserId,
    pub enrollment: EnrollmentId,
    pub program: ProgramId,
    pub receipt: Option<StoredFile>,
    pub staff_signature: Option<StaffSignatureId>,
    pub status: ClearanceStatus,
    pub feedback: String,
}

/// Staff signature payload before the registry assigns an id.
#[derive(Debug, Clone)]
pub struct NewStaffSignature {
    pub staff: UserId,
    pub image: Option<StoredFile>,
    pub description: String,
}

/// Storage abstraction over the three collections the workflow owns: rounds,
/// enrollments, and signature records. Each method is a single storage
/// transaction; callers compose reads and one write per operation, so a
/// record's fields always commit together.
pub trait ClearanceStore: Send + Sync {
    fn insert_round(&self, round: NewRound) -> Result<ClearanceRound, RepositoryError>;
    fn round(&self, id: RoundId) -> Result<Option<ClearanceRound>, RepositoryError>;
    /// All rounds in insertion order.
    fn rounds(&self) -> Result<Vec<ClearanceRound>, RepositoryError>;
    /// Round with the greatest (created_at, id), or None when empty.
    fn latest_round(&self) -> Result<Option<ClearanceRound>, RepositoryError>;

    /// Fails with `Conflict` when an enrollment for the same (student, round)
    /// pair already exists; the uniqueness check lives here so it holds under
    /// concurrent requests.
    fn insert_enrollment(
        &self,
        enrollment: NewEnrollment,
    ) -> Result<StudentClearance, RepositoryError>;
    fn enrollment(&self, id: EnrollmentId) -> Result<Option<StudentClearance>, RepositoryError>;
    fn enrollments(&self) -> Result<Vec<StudentClearance>, RepositoryError>;
    fn enrollments_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<StudentClearance>, RepositoryError>;
    /// The student's most recent enrollment by id, i.e. the latest created.
    fn latest_enrollment_for_student(
        &self,
        student: UserId,
    ) -> Result<Option<StudentClearance>, RepositoryError>;
    fn update_enrollment(&self, enrollment: StudentClearance) -> Result<(), RepositoryError>;

    fn insert_signature_record(
        &self,
        record: NewSignatureRecord,
    ) -> Result<ClearanceSignature, RepositoryError>;
    fn signature_record(
        &self,
        id: SignatureRecordId,
    ) -> Result<Option<ClearanceSignature>, RepositoryError>;
    /// All records in storage (insertion) order.
    fn signature_records(&self) -> Result<Vec<ClearanceSignature>, RepositoryError>;
    /// Records for a (student, program) pair in storage order.
    fn signature_records_for(
        &self,
        student: UserId,
        program: ProgramId,
    ) -> Result<Vec<ClearanceSignature>, RepositoryError>;
    fn update_signature_record(&self, record: ClearanceSignature) -> Result<(), RepositoryError>;
}

/// Read-only program catalog collaborator.
pub trait ProgramCatalog: Send + Sync {
    fn program(&self, id: ProgramId) -> Result<Option<Program>, RepositoryError>;
    /// Every known program, oldest first.
    fn programs(&self) -> Result<Vec<Program>, RepositoryError>;
}

/// Read-only identity and profile collaborator.
pub trait IdentityStore: Send + Sync {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn student_profile(&self, user: UserId) -> Result<Option<StudentProfile>, RepositoryError>;
}

/// Staff signature registry collaborator. The single-slot-per-staff rule is
/// enforced by the service layer via `for_staff` + `remove`.
pub trait SignatureRegistry: Send + Sync {
    fn insert(&self, signature: NewStaffSignature) -> Result<StaffSignature, RepositoryError>;
    fn by_id(&self, id: StaffSignatureId) -> Result<Option<StaffSignature>, RepositoryError>;
    fn for_staff(&self, staff: UserId) -> Result<Option<StaffSignature>, RepositoryError>;
    fn remove(&self, id: StaffSignatureId) -> Result<(), RepositoryError>;
}

/// Append-only per-user message log.
pub trait NotificationLog: Send + Sync {
    fn append(
        &self,
        user: UserId,
        title: &str,
        message: &str,
    ) -> Result<Notification, RepositoryError>;
    /// Messages for a user, newest first.
    fn for_user(&self, user: UserId) -> Result<Vec<Notification>, RepositoryError>;
}

/// Blob store collaborator for receipts and signature images.
pub trait ReceiptVault: Send + Sync {
    fn store(&self, upload: &FileUpload, folder: &str) -> Result<StoredFile, RepositoryError>;
    fn delete(&self, file: &StoredFile) -> Result<(), RepositoryError>;
}
