//! Courtroom roles and the per-role profile table.
//!
//! Every role-specific string or parameter (prompt duties, placeholder
//! text, voice hints) lives in [`ROLE_PROFILES`]. Callers look a profile up
//! through [`Role::profile`] instead of branching on the role.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Functional identity of a participant in a proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Presiding judge.
    Judge,
    /// Counsel for the plaintiff.
    #[serde(alias = "lawyer_plaintiff")]
    CounselPlaintiff,
    /// Counsel for the defendant.
    #[serde(alias = "lawyer_defendant")]
    CounselDefendant,
    /// Jury panel.
    #[serde(alias = "jury")]
    Panel,
}

impl Role {
    /// All roles in seating order.
    pub const ALL: [Self; 4] = [
        Self::Judge,
        Self::CounselPlaintiff,
        Self::CounselDefendant,
        Self::Panel,
    ];

    /// Returns the snake-case key used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Judge => "judge",
            Self::CounselPlaintiff => "counsel_plaintiff",
            Self::CounselDefendant => "counsel_defendant",
            Self::Panel => "panel",
        }
    }

    /// Returns the static profile for this role.
    #[must_use]
    pub fn profile(self) -> &'static RoleProfile {
        &ROLE_PROFILES[self as usize]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speech synthesis hints for a rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceProfile {
    /// Relative pitch (1.0 = neutral).
    pub pitch: f32,
    /// Relative speaking rate (1.0 = neutral).
    pub rate: f32,
}

/// Static, role-keyed attributes.
#[derive(Debug)]
pub struct RoleProfile {
    /// Role this profile describes.
    pub role: Role,
    /// Human-readable role title used in prompts ("presiding judge").
    pub title: &'static str,
    /// Default display name for the participant holding this role.
    pub default_name: &'static str,
    /// Default personality description.
    pub default_personality: &'static str,
    /// Default avatar glyph.
    pub default_avatar: &'static str,
    /// Responsibilities listed in the system prompt.
    pub duties: &'static [&'static str],
    /// Final instruction appended to the system prompt.
    pub closing_instruction: &'static str,
    /// Statement substituted when generation fails for this role.
    pub placeholder: &'static str,
    /// Voice hints for narration.
    pub voice: VoiceProfile,
}

/// Profile table indexed by `Role as usize`.
pub static ROLE_PROFILES: [RoleProfile; 4] = [
    RoleProfile {
        role: Role::Judge,
        title: "presiding judge",
        default_name: "Judge Martinez",
        default_personality: "Fair, experienced, and no-nonsense. Maintains order while ensuring both sides are heard.",
        default_avatar: "👨‍⚖️",
        duties: &[
            "Maintain order and fairness in the courtroom",
            "Ask clarifying questions when needed",
            "Ensure both sides present their arguments",
            "Make procedural rulings",
            "Keep arguments focused and relevant",
        ],
        closing_instruction: "Respond as the presiding judge would, maintaining judicial decorum while being engaging for this simulation.",
        placeholder: "The court notes that this statement could not be recorded. We will proceed.",
        voice: VoiceProfile {
            pitch: 0.8,
            rate: 0.9,
        },
    },
    RoleProfile {
        role: Role::CounselPlaintiff,
        title: "plaintiff's counsel",
        default_name: "Attorney Sarah Chen",
        default_personality: "Passionate advocate with strong analytical skills. Uses emotional appeals backed by solid logic.",
        default_avatar: "👩‍💼",
        duties: &[
            "Advocate strongly for the plaintiff's position",
            "Present compelling arguments and evidence",
            "Anticipate and counter defense arguments",
            "Use both logical and emotional appeals appropriately",
            "Cross-examine when applicable",
        ],
        closing_instruction: "You represent the plaintiff. Build a strong case for why they should prevail.",
        placeholder: "Counsel for the plaintiff reserves this statement and asks the court to proceed.",
        voice: VoiceProfile {
            pitch: 1.1,
            rate: 1.0,
        },
    },
    RoleProfile {
        role: Role::CounselDefendant,
        title: "defendant's counsel",
        default_name: "Attorney Michael Torres",
        default_personality: "Methodical defense attorney who focuses on facts and reasonable doubt. Calm under pressure.",
        default_avatar: "👨‍💼",
        duties: &[
            "Defend your client vigorously and ethically",
            "Challenge the plaintiff's evidence and arguments",
            "Present alternative explanations or mitigating factors",
            "Raise reasonable doubt where applicable",
            "Cross-examine witnesses effectively",
        ],
        closing_instruction: "You represent the defendant. Build a strong defense and challenge weak points in the plaintiff's case.",
        placeholder: "Counsel for the defense reserves this statement and asks the court to proceed.",
        voice: VoiceProfile {
            pitch: 0.9,
            rate: 0.95,
        },
    },
    RoleProfile {
        role: Role::Panel,
        title: "jury",
        default_name: "The Jury",
        default_personality: "A diverse panel of 12 members who deliberate carefully and consider all evidence presented.",
        default_avatar: "👥",
        duties: &[
            "Listen carefully to all arguments and evidence",
            "Deliberate on the facts presented",
            "Consider the credibility of all parties",
            "Reach a fair verdict based on the preponderance of evidence",
            "Provide reasoning for your decision",
        ],
        closing_instruction: "As the jury, you must weigh all evidence and arguments to reach a just verdict.",
        placeholder: "The jury requires more time; its statement could not be recorded.",
        voice: VoiceProfile {
            pitch: 1.0,
            rate: 0.85,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_table_is_indexed_by_role() {
        for role in Role::ALL {
            assert_eq!(role.profile().role, role);
        }
    }

    #[test]
    fn placeholders_are_distinct_per_role() {
        let mut seen = std::collections::HashSet::new();
        for role in Role::ALL {
            assert!(seen.insert(role.profile().placeholder), "duplicate for {role}");
        }
    }

    #[test]
    fn role_deserializes_from_snake_case_and_aliases() {
        let role: Role = serde_yaml::from_str("counsel_plaintiff").unwrap();
        assert_eq!(role, Role::CounselPlaintiff);
        let role: Role = serde_yaml::from_str("lawyer_defendant").unwrap();
        assert_eq!(role, Role::CounselDefendant);
        let role: Role = serde_yaml::from_str("jury").unwrap();
        assert_eq!(role, Role::Panel);
    }

    #[test]
    fn display_matches_serde_key() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }
}
