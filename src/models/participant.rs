//! Participant, registration status and the symmetric partner link.

use crate::models::error::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in teams and lookups).
pub type ParticipantId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// A registered participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Individual ranking; feeds the team's average ranking in standings.
    #[serde(default)]
    pub ranking: Option<f64>,
    /// Set on both sides when a partner invite is accepted.
    #[serde(default)]
    pub partner_id: Option<ParticipantId>,
    #[serde(default)]
    pub status: RegistrationStatus,
}

impl Participant {
    /// Create a new participant with the given name. Registration starts as pending.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            phone: None,
            ranking: None,
            partner_id: None,
            status: RegistrationStatus::Pending,
        }
    }

    /// Same as `new`, already confirmed.
    pub fn confirmed(name: impl Into<String>) -> Self {
        Self {
            status: RegistrationStatus::Confirmed,
            ..Self::new(name)
        }
    }

    pub fn with_ranking(mut self, ranking: f64) -> Self {
        self.ranking = Some(ranking);
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}

fn index_of(participants: &[Participant], id: ParticipantId) -> Result<usize, TournamentError> {
    participants
        .iter()
        .position(|p| p.id == id)
        .ok_or(TournamentError::ParticipantNotFound(id))
}

/// Accept a partner invite: link `a` and `b` on both sides.
///
/// Re-linking an existing pair is a no-op. Either side already partnered with someone
/// else is rejected; unlink first.
pub fn link_partners(
    participants: &mut [Participant],
    a: ParticipantId,
    b: ParticipantId,
) -> Result<(), TournamentError> {
    let ia = index_of(participants, a)?;
    let ib = index_of(participants, b)?;
    if a == b {
        return Err(TournamentError::DuplicateParticipant { participant_id: a });
    }
    for (idx, other) in [(ia, b), (ib, a)] {
        if let Some(current) = participants[idx].partner_id {
            if current != other {
                return Err(TournamentError::DuplicateParticipant {
                    participant_id: participants[idx].id,
                });
            }
        }
    }
    participants[ia].partner_id = Some(b);
    participants[ib].partner_id = Some(a);
    Ok(())
}

/// Decline or withdraw: clear the link on `id` and on whoever it pointed at.
pub fn unlink_partner(participants: &mut [Participant], id: ParticipantId) -> Result<(), TournamentError> {
    let idx = index_of(participants, id)?;
    if let Some(partner) = participants[idx].partner_id.take() {
        if let Some(p) = participants
            .iter_mut()
            .find(|p| p.id == partner && p.partner_id == Some(id))
        {
            p.partner_id = None;
        }
    }
    Ok(())
}
