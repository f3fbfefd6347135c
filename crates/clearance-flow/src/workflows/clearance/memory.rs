//! In-memory implementations of the storage and collaborator traits.
//!
//! These back the API service and the test suites. Ids are assigned from
//! per-collection counters under the same lock as the insert, so id order is
//! insertion order — the property the engine's recency rules rely on.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{
    ClearanceRound, ClearanceSignature, EnrollmentId, Notification, NotificationId, Program,
    ProgramId, RoundId, SignatureRecordId, StaffSignature, StaffSignatureId, StudentClearance,
    StudentProfile, UserAccount, UserId,
};
use super::files::{FileUpload, StoredFile};
use super::repository::{
    ClearanceStore, IdentityStore, NewEnrollment, NewRound, NewSignatureRecord, NewStaffSignature,
    NotificationLog, ProgramCatalog, ReceiptVault, RepositoryError, SignatureRegistry,
};

#[derive(Default)]
struct StoreState {
    rounds: Vec<ClearanceRound>,
    enrollments: Vec<StudentClearance>,
    records: Vec<ClearanceSignature>,
    next_round: u64,
    next_enrollment: u64,
    next_record: u64,
}

/// Mutex-backed store for the three workflow-owned collections.
#[derive(Default)]
pub struct MemoryClearanceStore {
    state: Mutex<StoreState>,
}

impl ClearanceStore for MemoryClearanceStore {
    fn insert_round(&self, round: NewRound) -> Result<ClearanceRound, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.next_round += 1;
        let round = ClearanceRound {
            id: RoundId(state.next_round),
            programs: round.programs,
            created_at: round.created_at,
            updated_at: round.updated_at,
            semester: round.semester,
            academic_year: round.academic_year,
        };
        state.rounds.push(round.clone());
        Ok(round)
    }

    fn round(&self, id: RoundId) -> Result<Option<ClearanceRound>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.rounds.iter().find(|round| round.id == id).cloned())
    }

    fn rounds(&self) -> Result<Vec<ClearanceRound>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.rounds.clone())
    }

    fn latest_round(&self) -> Result<Option<ClearanceRound>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .rounds
            .iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    fn insert_enrollment(
        &self,
        enrollment: NewEnrollment,
    ) -> Result<StudentClearance, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        // Unique (student, round) index; checked under the insert lock so the
        // Conflict answer holds under concurrent requests.
        let duplicate = state
            .enrollments
            .iter()
            .any(|existing| existing.student == enrollment.student && existing.round == enrollment.round);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        state.next_enrollment += 1;
        let enrollment = StudentClearance {
            id: EnrollmentId(state.next_enrollment),
            student: enrollment.student,
            round: enrollment.round,
            status: enrollment.status,
        };
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    fn enrollment(&self, id: EnrollmentId) -> Result<Option<StudentClearance>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.enrollments.iter().find(|e| e.id == id).cloned())
    }

    fn enrollments(&self) -> Result<Vec<StudentClearance>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.enrollments.clone())
    }

    fn enrollments_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<StudentClearance>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .enrollments
            .iter()
            .filter(|e| e.student == student)
            .cloned()
            .collect())
    }

    fn latest_enrollment_for_student(
        &self,
        student: UserId,
    ) -> Result<Option<StudentClearance>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .enrollments
            .iter()
            .filter(|e| e.student == student)
            .max_by_key(|e| e.id)
            .cloned())
    }

    fn update_enrollment(&self, enrollment: StudentClearance) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state.enrollments.iter_mut().find(|e| e.id == enrollment.id) {
            Some(slot) => {
                *slot = enrollment;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn insert_signature_record(
        &self,
        record: NewSignatureRecord,
    ) -> Result<ClearanceSignature, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.next_record += 1;
        let record = ClearanceSignature {
            id: SignatureRecordId(state.next_record),
            student: record.student,
            enrollment: record.enrollment,
            program: record.program,
            receipt: record.receipt,
            staff_signature: record.staff_signature,
            status: record.status,
            feedback: record.feedback,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    fn signature_record(
        &self,
        id: SignatureRecordId,
    ) -> Result<Option<ClearanceSignature>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.records.iter().find(|r| r.id == id).cloned())
    }

    fn signature_records(&self) -> Result<Vec<ClearanceSignature>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.records.clone())
    }

    fn signature_records_for(
        &self,
        student: UserId,
        program: ProgramId,
    ) -> Result<Vec<ClearanceSignature>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .records
            .iter()
            .filter(|r| r.student == student && r.program == program)
            .cloned()
            .collect())
    }

    fn update_signature_record(&self, record: ClearanceSignature) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default)]
struct CampusState {
    programs: Vec<Program>,
    users: Vec<UserAccount>,
    profiles: Vec<StudentProfile>,
    next_program: u64,
    next_user: u64,
}

/// Seedable identity + catalog collaborator.
#[derive(Default)]
pub struct MemoryCampus {
    state: Mutex<CampusState>,
}

impl MemoryCampus {
    pub fn add_program(&self, name: &str, description: &str) -> Program {
        let mut state = self.state.lock().expect("campus mutex poisoned");
        state.next_program += 1;
        let program = Program {
            id: ProgramId(state.next_program),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
            active: true,
        };
        state.programs.push(program.clone());
        program
    }

    pub fn add_student(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        year_level: &str,
        major: &str,
    ) -> UserAccount {
        let mut state = self.state.lock().expect("campus mutex poisoned");
        state.next_user += 1;
        let user = UserAccount {
            id: UserId(state.next_user),
            username: username.to_string(),
            email: format!("{username}@campus.edu"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_staff: false,
        };
        state.users.push(user.clone());
        state.profiles.push(StudentProfile {
            user: user.id,
            year_level: year_level.to_string(),
            major: major.to_string(),
        });
        user
    }

    pub fn add_staff(&self, username: &str, first_name: &str, last_name: &str) -> UserAccount {
        let mut state = self.state.lock().expect("campus mutex poisoned");
        state.next_user += 1;
        let user = UserAccount {
            id: UserId(state.next_user),
            username: username.to_string(),
            email: format!("{username}@campus.edu"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_staff: true,
        };
        state.users.push(user.clone());
        user
    }
}

impl ProgramCatalog for MemoryCampus {
    fn program(&self, id: ProgramId) -> Result<Option<Program>, RepositoryError> {
        let state = self.state.lock().expect("campus mutex poisoned");
        Ok(state.programs.iter().find(|p| p.id == id).cloned())
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        let state = self.state.lock().expect("campus mutex poisoned");
        Ok(state.programs.clone())
    }
}

impl IdentityStore for MemoryCampus {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let state = self.state.lock().expect("campus mutex poisoned");
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    fn student_profile(&self, user: UserId) -> Result<Option<StudentProfile>, RepositoryError> {
        let state = self.state.lock().expect("campus mutex poisoned");
        Ok(state.profiles.iter().find(|p| p.user == user).cloned())
    }
}

#[derive(Default)]
struct RegistryState {
    signatures: Vec<StaffSignature>,
    next: u64,
}

/// Mutex-backed staff signature registry.
#[derive(Default)]
pub struct MemorySignatureRegistry {
    state: Mutex<RegistryState>,
}

impl SignatureRegistry for MemorySignatureRegistry {
    fn insert(&self, signature: NewStaffSignature) -> Result<StaffSignature, RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        state.next += 1;
        let signature = StaffSignature {
            id: StaffSignatureId(state.next),
            staff: signature.staff,
            image: signature.image,
            description: signature.description,
        };
        state.signatures.push(signature.clone());
        Ok(signature)
    }

    fn by_id(&self, id: StaffSignatureId) -> Result<Option<StaffSignature>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.signatures.iter().find(|s| s.id == id).cloned())
    }

    fn for_staff(&self, staff: UserId) -> Result<Option<StaffSignature>, RepositoryError> {
        let state = self.state.lock().expect("registry mutex poisoned");
        Ok(state.signatures.iter().find(|s| s.staff == staff).cloned())
    }

    fn remove(&self, id: StaffSignatureId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        let before = state.signatures.len();
        state.signatures.retain(|s| s.id != id);
        if state.signatures.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
struct LogState {
    entries: Vec<Notification>,
    next: u64,
}

/// Append-only in-memory notification log.
#[derive(Default)]
pub struct MemoryNotificationLog {
    state: Mutex<LogState>,
}

impl NotificationLog for MemoryNotificationLog {
    fn append(
        &self,
        user: UserId,
        title: &str,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let mut state = self.state.lock().expect("log mutex poisoned");
        state.next += 1;
        let entry = Notification {
            id: NotificationId(state.next),
            user,
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    fn for_user(&self, user: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state.lock().expect("log mutex poisoned");
        let mut entries: Vec<Notification> = state
            .entries
            .iter()
            .filter(|n| n.user == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(entries)
    }
}

#[derive(Default)]
struct VaultState {
    blobs: HashMap<String, Vec<u8>>,
    next: u64,
}

/// Opaque blob store; the engine only ever keeps the returned reference.
#[derive(Default)]
pub struct MemoryReceiptVault {
    state: Mutex<VaultState>,
}

impl MemoryReceiptVault {
    pub fn contains(&self, key: &str) -> bool {
        let state = self.state.lock().expect("vault mutex poisoned");
        state.blobs.contains_key(key)
    }

    pub fn blob_count(&self) -> usize {
        let state = self.state.lock().expect("vault mutex poisoned");
        state.blobs.len()
    }
}

impl ReceiptVault for MemoryReceiptVault {
    fn store(&self, upload: &FileUpload, folder: &str) -> Result<StoredFile, RepositoryError> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        state.next += 1;
        let key = format!("{folder}/{:04}-{}", state.next, upload.filename);
        state.blobs.insert(key.clone(), upload.content.clone());
        Ok(StoredFile {
            key,
            filename: upload.filename.clone(),
        })
    }

    fn delete(&self, file: &StoredFile) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        state.blobs.remove(&file.key);
        Ok(())
    }
}
