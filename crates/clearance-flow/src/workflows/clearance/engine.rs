use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    ClearanceSignature, ClearanceStatus, ProgramId, RoundId, SignatureRecordId, StaffSignatureId,
    UserId,
};
use super::files::{validate_image_filename, FileUpload, StoredFile};
use super::repository::{
    ClearanceStore, IdentityStore, NewSignatureRecord, NotificationLog, ProgramCatalog,
    ReceiptVault, SignatureRegistry,
};
use super::{parse_status, ClearanceError};

/// Payload for creating a signature record.
#[derive(Debug, Default)]
pub struct NewSignatureRequest {
    pub signature_id: Option<StaffSignatureId>,
    pub status: Option<String>,
    pub feedback: Option<String>,
    pub receipt: Option<FileUpload>,
}

/// Partial update carrying the receipt-reset rule.
#[derive(Debug, Default)]
pub struct ReceiptUpdate {
    pub receipt: Option<FileUpload>,
    pub status: Option<String>,
    pub feedback: Option<String>,
}

/// The clearance signature workflow engine. Owns the per-record state
/// machine (Pending/Approved/Rejected, no terminal state), the staff
/// signature attachment rule, the receipt-forces-reset rule, and the query
/// surface over signature records.
pub struct SignatureWorkflowEngine {
    store: Arc<dyn ClearanceStore>,
    identity: Arc<dyn IdentityStore>,
    catalog: Arc<dyn ProgramCatalog>,
    signatures: Arc<dyn SignatureRegistry>,
    notifications: Arc<dyn NotificationLog>,
    receipts: Arc<dyn ReceiptVault>,
}

impl SignatureWorkflowEngine {
    pub fn new(
        store: Arc<dyn ClearanceStore>,
        identity: Arc<dyn IdentityStore>,
        catalog: Arc<dyn ProgramCatalog>,
        signatures: Arc<dyn SignatureRegistry>,
        notifications: Arc<dyn NotificationLog>,
        receipts: Arc<dyn ReceiptVault>,
    ) -> Self {
        Self {
            store,
            identity,
            catalog,
            signatures,
            notifications,
            receipts,
        }
    }

    /// Create a signature record for (student, program) against the
    /// student's most recent enrollment. This ALWAYS inserts a new row —
    /// repeated calls produce duplicates, and the recency rules elsewhere
    /// (`latest_feedback`) are defined over that. Do not add get-or-create
    /// deduplication here.
    pub fn create_signature_record(
        &self,
        student: UserId,
        program: ProgramId,
        request: NewSignatureRequest,
    ) -> Result<ClearanceSignature, ClearanceError> {
        self.identity
            .user(student)?
            .ok_or(ClearanceError::NotFound { entity: "student" })?;
        self.catalog
            .program(program)?
            .ok_or(ClearanceError::NotFound { entity: "program" })?;

        // Latest enrollment by id, i.e. the student's current round.
        let enrollment = self
            .store
            .latest_enrollment_for_student(student)?
            .ok_or(ClearanceError::NotFound {
                entity: "student clearance",
            })?;

        let staff_signature = match request.signature_id {
            Some(id) => Some(
                self.signatures
                    .by_id(id)?
                    .ok_or(ClearanceError::NotFound {
                        entity: "staff signature",
                    })?
                    .id,
            ),
            None => None,
        };

        let status = match request.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => ClearanceStatus::Pending,
        };

        let receipt = match &request.receipt {
            Some(upload) => Some(self.store_receipt(upload)?),
            None => None,
        };

        let inserted = self.store.insert_signature_record(NewSignatureRecord {
            student,
            enrollment: enrollment.id,
            program,
            receipt: receipt.clone(),
            staff_signature,
            status,
            feedback: request.feedback.unwrap_or_default(),
        });

        match inserted {
            Ok(record) => {
                debug!(
                    record = record.id.0,
                    student = student.0,
                    program = program.0,
                    "signature record created"
                );
                Ok(record)
            }
            Err(err) => {
                // Keep the vault free of references no record points at.
                if let Some(stored) = &receipt {
                    let _ = self.receipts.delete(stored);
                }
                Err(err.into())
            }
        }
    }

    /// First record for (student, program) in storage order. `None` means
    /// "no signature yet" and is a successful outcome, distinct from the
    /// NotFound raised when the student or program themselves are missing.
    pub fn lookup(
        &self,
        student: UserId,
        program: ProgramId,
    ) -> Result<Option<ClearanceSignature>, ClearanceError> {
        self.identity
            .user(student)?
            .ok_or(ClearanceError::NotFound { entity: "student" })?;
        self.catalog
            .program(program)?
            .ok_or(ClearanceError::NotFound { entity: "program" })?;

        Ok(self
            .store
            .signature_records_for(student, program)?
            .into_iter()
            .next())
    }

    /// Round-qualified lookup. All three qualifiers filter: the record must
    /// belong to an enrollment in the given round.
    pub fn lookup_by_round(
        &self,
        round: RoundId,
        student: UserId,
        program: ProgramId,
    ) -> Result<Option<ClearanceSignature>, ClearanceError> {
        self.identity
            .user(student)?
            .ok_or(ClearanceError::NotFound { entity: "student" })?;
        self.catalog
            .program(program)?
            .ok_or(ClearanceError::NotFound { entity: "program" })?;

        for record in self.store.signature_records_for(student, program)? {
            let in_round = self
                .store
                .enrollment(record.enrollment)?
                .is_some_and(|enrollment| enrollment.round == round);
            if in_round {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Staff transition of a record to any of the three states.
    ///
    /// Approving requires a staff id and that staff's on-file signature; the
    /// signature ref is attached via compare-and-set so a repeat approval by
    /// the same staff touches nothing but the status. Rejecting with
    /// non-empty feedback overwrites the stored feedback; empty or absent
    /// feedback leaves the prior text in place. Status and signature ref go
    /// to storage in one write.
    pub fn transition_status(
        &self,
        id: SignatureRecordId,
        new_status: &str,
        staff: Option<UserId>,
        feedback: Option<&str>,
    ) -> Result<ClearanceSignature, ClearanceError> {
        let mut record = self
            .store
            .signature_record(id)?
            .ok_or(ClearanceError::NotFound {
                entity: "clearance signature",
            })?;
        let status = parse_status(new_status)?;

        if status == ClearanceStatus::Approved {
            let staff = staff.ok_or_else(|| {
                ClearanceError::InvalidArgument(
                    "staff_id is required when approving".to_string(),
                )
            })?;
            let on_file = self
                .signatures
                .for_staff(staff)?
                .ok_or(ClearanceError::NotFound {
                    entity: "staff signature",
                })?;
            if record.staff_signature != Some(on_file.id) {
                record.staff_signature = Some(on_file.id);
            }
        }

        if status == ClearanceStatus::Rejected {
            if let Some(feedback) = feedback.filter(|text| !text.is_empty()) {
                record.feedback = feedback.to_string();
            }
        }

        record.status = status;
        self.store.update_signature_record(record.clone())?;

        info!(
            record = record.id.0,
            status = status.label(),
            "signature record transitioned"
        );
        self.notify_student(&record)?;
        Ok(record)
    }

    /// Partial update of receipt/status/feedback. A new receipt re-opens
    /// review: the record is reset to Pending with feedback cleared BEFORE
    /// any explicit status/feedback from the same call are applied on top.
    /// A receipt-only submission therefore always lands Pending and blank.
    pub fn submit_receipt(
        &self,
        id: SignatureRecordId,
        update: ReceiptUpdate,
    ) -> Result<ClearanceSignature, ClearanceError> {
        let mut record = self
            .store
            .signature_record(id)?
            .ok_or(ClearanceError::NotFound {
                entity: "clearance signature",
            })?;

        // Validate everything before the first write so a bad argument
        // cannot strand a stored blob.
        let explicit_status = match update.status.as_deref() {
            Some(raw) => Some(parse_status(raw)?),
            None => None,
        };

        let stored = match &update.receipt {
            Some(upload) => Some(self.store_receipt(upload)?),
            None => None,
        };

        if let Some(stored) = stored.clone() {
            record.receipt = Some(stored);
            record.status = ClearanceStatus::Pending;
            record.feedback.clear();
        }

        if let Some(status) = explicit_status {
            record.status = status;
        }
        if let Some(feedback) = update.feedback {
            record.feedback = feedback;
        }

        if let Err(err) = self.store.update_signature_record(record.clone()) {
            if let Some(stored) = &stored {
                let _ = self.receipts.delete(stored);
            }
            return Err(err.into());
        }

        debug!(record = record.id.0, "receipt update applied");
        Ok(record)
    }

    /// The most recent feedback for (student, program): highest-id record
    /// whose feedback is non-empty. Id is the recency proxy; the records
    /// carry no timestamps.
    pub fn latest_feedback(
        &self,
        program: ProgramId,
        student: UserId,
    ) -> Result<ClearanceSignature, ClearanceError> {
        self.store
            .signature_records_for(student, program)?
            .into_iter()
            .filter(|record| !record.feedback.is_empty())
            .max_by_key(|record| record.id)
            .ok_or(ClearanceError::NotFound { entity: "feedback" })
    }

    /// Filtered listing over all records. Each filter is skipped when absent
    /// or the literal sentinel "none"; active filters are case-insensitive
    /// substring matches, AND-combined. Records whose student lacks the
    /// joined data (e.g. no profile when filtering by year level) simply do
    /// not match.
    pub fn query_by_filters(
        &self,
        program: Option<&str>,
        last_name: Option<&str>,
        year_level: Option<&str>,
    ) -> Result<Vec<ClearanceSignature>, ClearanceError> {
        let program = active_filter(program);
        let last_name = active_filter(last_name);
        let year_level = active_filter(year_level);

        let mut matches = Vec::new();
        for record in self.store.signature_records()? {
            if let Some(needle) = program {
                let name = match self.catalog.program(record.program)? {
                    Some(program) => program.name,
                    None => continue,
                };
                if !contains_ci(&name, needle) {
                    continue;
                }
            }
            if let Some(needle) = last_name {
                let surname = match self.identity.user(record.student)? {
                    Some(user) => user.last_name,
                    None => continue,
                };
                if !contains_ci(&surname, needle) {
                    continue;
                }
            }
            if let Some(needle) = year_level {
                let level = match self.identity.student_profile(record.student)? {
                    Some(profile) => profile.year_level,
                    None => continue,
                };
                if !contains_ci(&level, needle) {
                    continue;
                }
            }
            matches.push(record);
        }
        Ok(matches)
    }

    fn store_receipt(&self, upload: &FileUpload) -> Result<StoredFile, ClearanceError> {
        validate_image_filename(&upload.filename)?;
        Ok(self.receipts.store(upload, "receipts")?)
    }

    fn notify_student(&self, record: &ClearanceSignature) -> Result<(), ClearanceError> {
        let program = self
            .catalog
            .program(record.program)?
            .ok_or(ClearanceError::NotFound { entity: "program" })?;
        self.notifications.append(
            record.student,
            "Clearance update",
            &format!(
                "Your {} clearance is now {}.",
                program.name,
                record.status.label()
            ),
        )?;
        Ok(())
    }
}

/// A filter is active unless absent or the "none" sentinel.
fn active_filter(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.eq_ignore_ascii_case("none"))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
