//! Serialized response views. These resolve referenced users, programs, and
//! signatures into nested payloads so callers never chase ids themselves.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ClearanceRound, ClearanceSignature, EnrollmentId, Notification, NotificationId, Program,
    ProgramId, RoundId, SignatureRecordId, StaffSignature, StaffSignatureId, StudentClearance,
    UserAccount, UserId,
};
use super::files::StoredFile;
use super::repository::{ClearanceStore, IdentityStore, ProgramCatalog, SignatureRegistry};
use super::ClearanceError;

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl From<UserAccount> for UserView {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub active: bool,
}

impl From<Program> for ProgramView {
    fn from(program: Program) -> Self {
        Self {
            id: program.id,
            name: program.name,
            description: program.description,
            active: program.active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFileView {
    pub key: String,
    pub filename: String,
    pub content_type: String,
}

impl From<StoredFile> for StoredFileView {
    fn from(file: StoredFile) -> Self {
        let content_type = file.media_type().to_string();
        Self {
            key: file.key,
            filename: file.filename,
            content_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub id: RoundId,
    pub semester: String,
    pub academic_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub programs: Vec<ProgramView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentView {
    pub id: EnrollmentId,
    pub student: UserView,
    pub round: RoundView,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffSignatureView {
    pub id: StaffSignatureId,
    pub staff_id: UserId,
    pub image: Option<StoredFileView>,
    pub description: String,
}

impl From<StaffSignature> for StaffSignatureView {
    fn from(signature: StaffSignature) -> Self {
        Self {
            id: signature.id,
            staff_id: signature.staff,
            image: signature.image.map(StoredFileView::from),
            description: signature.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureRecordView {
    pub id: SignatureRecordId,
    pub student: UserView,
    pub program: ProgramView,
    pub enrollment_id: EnrollmentId,
    pub receipt: Option<StoredFileView>,
    pub signature: Option<StaffSignatureView>,
    pub status: &'static str,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub id: SignatureRecordId,
    pub student_id: UserId,
    pub student_name: String,
    pub program_id: ProgramId,
    pub program_name: String,
    pub status: &'static str,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            created_at: notification.created_at,
        }
    }
}

pub fn round_view(
    round: &ClearanceRound,
    catalog: &dyn ProgramCatalog,
) -> Result<RoundView, ClearanceError> {
    let mut programs = Vec::with_capacity(round.programs.len());
    for id in &round.programs {
        let program = catalog
            .program(*id)?
            .ok_or(ClearanceError::NotFound { entity: "program" })?;
        programs.push(ProgramView::from(program));
    }
    Ok(RoundView {
        id: round.id,
        semester: round.semester.clone(),
        academic_year: round.academic_year.clone(),
        created_at: round.created_at,
        updated_at: round.updated_at,
        programs,
    })
}

pub fn enrollment_view(
    enrollment: &StudentClearance,
    store: &dyn ClearanceStore,
    identity: &dyn IdentityStore,
    catalog: &dyn ProgramCatalog,
) -> Result<EnrollmentView, ClearanceError> {
    let student = identity
        .user(enrollment.student)?
        .ok_or(ClearanceError::NotFound { entity: "student" })?;
    let round = store
        .round(enrollment.round)?
        .ok_or(ClearanceError::NotFound {
            entity: "clearance round",
        })?;
    Ok(EnrollmentView {
        id: enrollment.id,
        student: UserView::from(student),
        round: round_view(&round, catalog)?,
        status: enrollment.status.label(),
    })
}

pub fn signature_record_view(
    record: &ClearanceSignature,
    identity: &dyn IdentityStore,
    catalog: &dyn ProgramCatalog,
    registry: &dyn SignatureRegistry,
) -> Result<SignatureRecordView, ClearanceError> {
    let student = identity
        .user(record.student)?
        .ok_or(ClearanceError::NotFound { entity: "student" })?;
    let program = catalog
        .program(record.program)?
        .ok_or(ClearanceError::NotFound { entity: "program" })?;

    // A staff signature can be replaced after a record referenced it; the
    // stale ref renders as absent rather than failing the whole view.
    let signature = match record.staff_signature {
        Some(id) => registry.by_id(id)?.map(StaffSignatureView::from),
        None => None,
    };

    Ok(SignatureRecordView {
        id: record.id,
        student: UserView::from(student),
        program: ProgramView::from(program),
        enrollment_id: record.enrollment,
        receipt: record.receipt.clone().map(StoredFileView::from),
        signature,
        status: record.status.label(),
        feedback: record.feedback.clone(),
    })
}

pub fn feedback_view(
    record: &ClearanceSignature,
    identity: &dyn IdentityStore,
    catalog: &dyn ProgramCatalog,
) -> Result<FeedbackView, ClearanceError> {
    let student = identity
        .user(record.student)?
        .ok_or(ClearanceError::NotFound { entity: "student" })?;
    let program = catalog
        .program(record.program)?
        .ok_or(ClearanceError::NotFound { entity: "program" })?;
    Ok(FeedbackView {
        id: record.id,
        student_id: student.id,
        student_name: student.username,
        program_id: program.id,
        program_name: program.name,
        status: record.status.label(),
        feedback: record.feedback.clone(),
    })
}
