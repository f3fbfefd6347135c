use std::sync::Arc;

use tracing::info;

use super::domain::{StaffSignature, UserId};
use super::files::{validate_image_filename, FileUpload};
use super::repository::{IdentityStore, NewStaffSignature, ReceiptVault, SignatureRegistry};
use super::ClearanceError;

/// Staff signature desk: one mutable signature slot per staff member.
pub struct StaffSignatureDesk {
    identity: Arc<dyn IdentityStore>,
    registry: Arc<dyn SignatureRegistry>,
    vault: Arc<dyn ReceiptVault>,
}

impl StaffSignatureDesk {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        registry: Arc<dyn SignatureRegistry>,
        vault: Arc<dyn ReceiptVault>,
    ) -> Self {
        Self {
            identity,
            registry,
            vault,
        }
    }

    /// Replace the staff member's on-file signature. The prior image blob
    /// and record are deleted before the new one is inserted; no history is
    /// retained.
    pub fn upsert_signature(
        &self,
        staff: UserId,
        image: FileUpload,
        description: &str,
    ) -> Result<StaffSignature, ClearanceError> {
        let user = self
            .identity
            .user(staff)?
            .ok_or(ClearanceError::NotFound { entity: "staff" })?;
        if !user.is_staff {
            return Err(ClearanceError::InvalidArgument(format!(
                "user '{}' is not a staff account",
                user.username
            )));
        }
        validate_image_filename(&image.filename)?;

        if let Some(previous) = self.registry.for_staff(staff)? {
            if let Some(file) = &previous.image {
                self.vault.delete(file)?;
            }
            self.registry.remove(previous.id)?;
            info!(
                staff = staff.0,
                replaced = previous.id.0,
                "prior staff signature discarded"
            );
        }

        let stored = self.vault.store(&image, "signatures")?;
        let signature = self.registry.insert(NewStaffSignature {
            staff,
            image: Some(stored),
            description: description.to_string(),
        })?;
        Ok(signature)
    }

    /// The staff member's current signature, if any is on file.
    pub fn signature_for_staff(&self, staff: UserId) -> Result<StaffSignature, ClearanceError> {
        self.registry
            .for_staff(staff)?
            .ok_or(ClearanceError::NotFound {
                entity: "staff signature",
            })
    }
}
