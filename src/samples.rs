//! Built-in sample cases
//!
//! Everyday disputes bundled with the binary so a proceeding can be run
//! without writing a case description: `mocktrial run --sample roommate-food`

use std::fmt;

use serde::Serialize;

use crate::court::CaseFiling;

// ============================================================================
// Types
// ============================================================================

/// A bundled dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleCase {
    /// Unique identifier (kebab-case, e.g., "money-lending").
    pub id: &'static str,
    /// Case title.
    pub title: &'static str,
    /// One-line summary in the complainant's words.
    pub summary: &'static str,
    /// Grouping for listings.
    pub category: SampleCategory,
    /// Label for the complaining party.
    pub plaintiff: &'static str,
    /// Label for the responding party.
    pub defendant: &'static str,
    /// Background facts.
    pub context: &'static str,
    /// What a reasonable outcome looks like.
    pub expected_outcome: &'static str,
}

impl SampleCase {
    /// Filing that opens a proceeding for this case.
    #[must_use]
    pub fn filing(&self) -> CaseFiling {
        CaseFiling::new(format!("{}. {}", self.summary, self.context)).with_title(self.title)
    }
}

/// Category of a sample case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SampleCategory {
    /// Shared housing.
    Roommate,
    /// School work.
    Academic,
    /// Partners and family.
    Relationship,
    /// Loans and payments.
    Financial,
    /// Colleagues and employers.
    Workplace,
}

impl SampleCategory {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roommate => "Roommate Disputes",
            Self::Academic => "Academic Disputes",
            Self::Relationship => "Relationship Disputes",
            Self::Financial => "Financial Disputes",
            Self::Workplace => "Workplace Disputes",
        }
    }
}

impl fmt::Display for SampleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Registry
// ============================================================================

static SAMPLES: [SampleCase; 5] = [
    SampleCase {
        id: "roommate-food",
        title: "The Great Food Theft",
        summary: "My roommate keeps eating my food without asking",
        category: SampleCategory::Roommate,
        plaintiff: "Responsible Roommate",
        defendant: "Food-Taking Roommate",
        context: "The plaintiff claims their roommate has been repeatedly taking their \
                  groceries and leftovers from the shared refrigerator without permission \
                  or compensation. This has happened multiple times over the past month, \
                  causing financial strain and frustration.",
        expected_outcome: "Compensation for food costs and agreement on kitchen rules",
    },
    SampleCase {
        id: "group-project",
        title: "The Slacker Partner",
        summary: "My teammate pushed all the work on me for the group project",
        category: SampleCategory::Academic,
        plaintiff: "Hardworking Student",
        defendant: "Absent Partner",
        context: "The plaintiff alleges that their group project partner failed to \
                  contribute meaningfully to a major assignment worth 40% of the final \
                  grade. Despite multiple attempts to coordinate and divide work, the \
                  defendant was unresponsive and missed all agreed-upon deadlines.",
        expected_outcome: "Grade adjustment or partner reassignment",
    },
    SampleCase {
        id: "relationship-job",
        title: "The Secret Application",
        summary: "My boyfriend didn't tell me he applied for a job abroad",
        category: SampleCategory::Relationship,
        plaintiff: "Concerned Partner",
        defendant: "Job-Seeking Partner",
        context: "The plaintiff discovered that their partner of two years applied for \
                  and accepted a job in another country without discussing this major \
                  life decision. They feel betrayed and question the future of their \
                  relationship.",
        expected_outcome: "Open communication and relationship counseling",
    },
    SampleCase {
        id: "money-lending",
        title: "The Unpaid Loan",
        summary: "My friend borrowed money and didn't return it",
        category: SampleCategory::Financial,
        plaintiff: "Generous Friend",
        defendant: "Borrowing Friend",
        context: "Six months ago, the plaintiff lent $500 to their close friend who \
                  claimed to have a family emergency. Despite multiple reminders and \
                  promises to pay back, the defendant has not returned the money and has \
                  become evasive about the topic.",
        expected_outcome: "Full repayment with possible payment plan",
    },
    SampleCase {
        id: "work-plagiarism",
        title: "The Stolen Design",
        summary: "I think my coworker stole my design idea",
        category: SampleCategory::Workplace,
        plaintiff: "Creative Employee",
        defendant: "Colleague",
        context: "The plaintiff spent weeks developing an innovative design concept for a \
                  client presentation. They shared early drafts with their colleague for \
                  feedback, but the defendant later presented a nearly identical design \
                  as their own work to management, receiving credit and praise.",
        expected_outcome: "Recognition of original work and potential disciplinary action",
    },
];

// ============================================================================
// Public API
// ============================================================================

/// Looks up a sample by exact id.
#[must_use]
pub fn find_sample(id: &str) -> Option<&'static SampleCase> {
    SAMPLES.iter().find(|s| s.id == id)
}

/// Lists samples, optionally filtered by category.
#[must_use]
pub fn list_samples(category: Option<SampleCategory>) -> Vec<&'static SampleCase> {
    SAMPLES
        .iter()
        .filter(|s| category.is_none_or(|c| s.category == c))
        .collect()
}

/// Suggests the closest sample id for a mistyped one.
///
/// Returns a match only within a Damerau-Levenshtein distance of 3.
#[must_use]
pub fn suggest_sample(input: &str) -> Option<&'static str> {
    SAMPLES
        .iter()
        .map(|s| (s.id, strsim::damerau_levenshtein(input, s.id)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(id, _)| id)
}

/// All sample ids in listing order.
#[must_use]
pub fn sample_ids() -> Vec<&'static str> {
    SAMPLES.iter().map(|s| s.id).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids = sample_ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn find_by_exact_id() {
        let sample = find_sample("money-lending").unwrap();
        assert_eq!(sample.title, "The Unpaid Loan");
        assert!(find_sample("Money-Lending").is_none());
    }

    #[test]
    fn filter_by_category() {
        let work = list_samples(Some(SampleCategory::Workplace));
        assert_eq!(work.len(), 1);
        assert_eq!(work[0].id, "work-plagiarism");
        assert_eq!(list_samples(None).len(), 5);
    }

    #[test]
    fn suggests_close_ids_only() {
        assert_eq!(suggest_sample("roomate-food"), Some("roommate-food"));
        assert_eq!(suggest_sample("group-projcet"), Some("group-project"));
        assert_eq!(suggest_sample("something else entirely"), None);
    }

    #[test]
    fn filing_combines_summary_and_context() {
        let sample = find_sample("roommate-food").unwrap();
        let filing = sample.filing();
        assert_eq!(filing.title.as_deref(), Some("The Great Food Theft"));
        assert!(
            filing
                .description
                .starts_with("My roommate keeps eating my food without asking. The plaintiff")
        );
        assert!(filing.validate().is_ok());
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_value(find_sample("group-project").unwrap()).unwrap();
        assert_eq!(json["category"], "academic");
        assert_eq!(json["id"], "group-project");
    }
}
