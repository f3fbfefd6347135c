use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{ClearanceRound, RoundId};
use super::repository::{ClearanceStore, NewRound, ProgramCatalog};
use super::ClearanceError;

/// Clearance term registry: creates rounds and answers "which round is
/// current".
pub struct RoundRegistry {
    store: Arc<dyn ClearanceStore>,
    catalog: Arc<dyn ProgramCatalog>,
}

impl RoundRegistry {
    pub fn new(store: Arc<dyn ClearanceStore>, catalog: Arc<dyn ProgramCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Create a round for the given term, snapshotting every program
    /// currently in the catalog. Programs added afterwards do not join this
    /// round; they are picked up by the next one created.
    pub fn create_round(
        &self,
        semester: &str,
        academic_year: &str,
    ) -> Result<ClearanceRound, ClearanceError> {
        let programs = self
            .catalog
            .programs()?
            .into_iter()
            .map(|program| program.id)
            .collect::<Vec<_>>();

        let now = Utc::now();
        let round = self.store.insert_round(NewRound {
            programs,
            semester: semester.to_string(),
            academic_year: academic_year.to_string(),
            created_at: now,
            updated_at: now,
        })?;

        info!(
            round = round.id.0,
            semester, academic_year,
            programs = round.programs.len(),
            "clearance round created"
        );
        Ok(round)
    }

    /// The current round: greatest created_at, id as tiebreak. Always a
    /// query against storage, never a cached pointer.
    pub fn latest_round(&self) -> Result<ClearanceRound, ClearanceError> {
        self.store
            .latest_round()?
            .ok_or(ClearanceError::NotFound {
                entity: "clearance round",
            })
    }

    pub fn get_round(&self, id: RoundId) -> Result<ClearanceRound, ClearanceError> {
        self.store.round(id)?.ok_or(ClearanceError::NotFound {
            entity: "clearance round",
        })
    }

    /// All rounds, newest first.
    pub fn list_rounds(&self) -> Result<Vec<ClearanceRound>, ClearanceError> {
        let mut rounds = self.store.rounds()?;
        rounds.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rounds)
    }
}
