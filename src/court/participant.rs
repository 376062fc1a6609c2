//! Participants and the per-proceeding registry.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// A role-bound participant. Immutable once the proceeding starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Unique id within the proceeding (`<role>-<proceeding id>`).
    pub id: String,
    /// Functional role.
    pub role: Role,
    /// Display name used in transcripts.
    pub name: String,
    /// Static personality description fed to the generator.
    pub personality: String,
    /// Avatar glyph for rendering layers.
    pub avatar: String,
}

/// Casting instructions for one role, as found in configuration.
///
/// Unset fields fall back to the role's profile defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ParticipantSpec {
    /// Role to cast.
    pub role: Role,

    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Personality override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,

    /// Avatar override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ParticipantSpec {
    /// Casting entry that uses every profile default for `role`.
    #[must_use]
    pub const fn defaults_for(role: Role) -> Self {
        Self {
            role,
            name: None,
            personality: None,
            avatar: None,
        }
    }
}

/// The fixed set of participants for one proceeding, at most one per role.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    /// Builds the default four-member cast for a proceeding.
    #[must_use]
    pub fn default_cast(proceeding_id: &str) -> Self {
        let specs: Vec<ParticipantSpec> =
            Role::ALL.into_iter().map(ParticipantSpec::defaults_for).collect();
        Self::from_specs(proceeding_id, &specs)
    }

    /// Builds a cast from explicit specs.
    ///
    /// A role appearing more than once keeps its first entry; configuration
    /// validation rejects such casts before they reach this point.
    #[must_use]
    pub fn from_specs(proceeding_id: &str, specs: &[ParticipantSpec]) -> Self {
        let mut participants: Vec<Participant> = Vec::with_capacity(specs.len());
        for spec in specs {
            if participants.iter().any(|p| p.role == spec.role) {
                continue;
            }
            let profile = spec.role.profile();
            participants.push(Participant {
                id: format!("{}-{proceeding_id}", spec.role.as_str().replace('_', "-")),
                role: spec.role,
                name: spec
                    .name
                    .clone()
                    .unwrap_or_else(|| profile.default_name.to_string()),
                personality: spec
                    .personality
                    .clone()
                    .unwrap_or_else(|| profile.default_personality.to_string()),
                avatar: spec
                    .avatar
                    .clone()
                    .unwrap_or_else(|| profile.default_avatar.to_string()),
            });
        }
        Self { participants }
    }

    /// Returns the participant holding `role`, if cast.
    #[must_use]
    pub fn by_role(&self, role: Role) -> Option<&Participant> {
        self.participants.iter().find(|p| p.role == role)
    }

    /// Returns the participant with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Returns whether `id` refers to a registered participant.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates participants in casting order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Number of registered participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns `true` if nobody is cast.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
