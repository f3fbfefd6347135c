use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{ClearanceStatus, EnrollmentId, RoundId, StudentClearance, UserId};
use super::repository::{ClearanceStore, IdentityStore, NewEnrollment};
use super::{parse_status, ClearanceError};

/// Student clearance tracker: enrollment into the current round and the
/// overall per-enrollment status.
pub struct EnrollmentTracker {
    store: Arc<dyn ClearanceStore>,
    identity: Arc<dyn IdentityStore>,
}

impl EnrollmentTracker {
    pub fn new(store: Arc<dyn ClearanceStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { store, identity }
    }

    /// Enroll a student into the latest round with status Pending. Fails
    /// with NotFound when the student or round is missing and Conflict when
    /// the (student, round) pair already exists; the uniqueness check lives
    /// in the store so it holds under concurrent requests.
    pub fn request_enrollment(&self, student: UserId) -> Result<StudentClearance, ClearanceError> {
        self.identity
            .user(student)?
            .ok_or(ClearanceError::NotFound { entity: "student" })?;

        let round = self
            .store
            .latest_round()?
            .ok_or(ClearanceError::NotFound {
                entity: "clearance round",
            })?;

        let enrollment = self.store.insert_enrollment(NewEnrollment {
            student,
            round: round.id,
            status: ClearanceStatus::Pending,
        })?;

        info!(
            student = student.0,
            round = round.id.0,
            "student enrolled into clearance round"
        );
        Ok(enrollment)
    }

    /// Enrollments for a student whose round shares the latest round's
    /// (semester, academic_year). This is a deliberate loose term match, NOT
    /// a round-id join: several round rows may share a term and all of them
    /// aggregate here. Do not "fix" this into an id-based lookup.
    pub fn list_for_student_matching_latest(
        &self,
        student: UserId,
    ) -> Result<Vec<StudentClearance>, ClearanceError> {
        let latest = match self.store.latest_round()? {
            Some(round) => round,
            None => return Ok(Vec::new()),
        };

        let rounds: HashMap<RoundId, _> = self
            .store
            .rounds()?
            .into_iter()
            .map(|round| (round.id, round))
            .collect();

        Ok(self
            .store
            .enrollments_for_student(student)?
            .into_iter()
            .filter(|enrollment| {
                rounds.get(&enrollment.round).is_some_and(|round| {
                    round.semester == latest.semester
                        && round.academic_year == latest.academic_year
                })
            })
            .collect())
    }

    /// Set the overall enrollment status. The per-program signature records
    /// are tracked independently; nothing cascades from here.
    pub fn set_status(
        &self,
        id: EnrollmentId,
        new_status: &str,
    ) -> Result<StudentClearance, ClearanceError> {
        let status = parse_status(new_status)?;
        let mut enrollment = self.store.enrollment(id)?.ok_or(ClearanceError::NotFound {
            entity: "student clearance",
        })?;

        enrollment.status = status;
        self.store.update_enrollment(enrollment.clone())?;
        Ok(enrollment)
    }

    /// Every enrollment, most recent round first.
    pub fn list_all(&self) -> Result<Vec<StudentClearance>, ClearanceError> {
        let rounds: HashMap<RoundId, _> = self
            .store
            .rounds()?
            .into_iter()
            .map(|round| (round.id, round.created_at))
            .collect();

        let mut enrollments = self.store.enrollments()?;
        enrollments.sort_by(|a, b| {
            let a_created = rounds.get(&a.round);
            let b_created = rounds.get(&b.round);
            b_created.cmp(&a_created).then(b.id.cmp(&a.id))
        });
        Ok(enrollments)
    }
}
