//! Match Scorer — two deliberately distinct score formulas.
//!
//! Algorithm A (`score_by_tags`): tag overlap against the employer-curated
//! tag set, used wherever tags are the authority (seeker-facing
//! recommendation lists, see `rank`).
//!
//! Algorithm B (`score_by_prose`): skill-in-prose containment against the
//! posting's requirements + description text, used by the background MATCH
//! task where only prose is available.
//!
//! The two are NOT interchangeable: their job-side inputs are structurally
//! different, so both entry points are kept and documented at call sites.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::normalizer::normalize;
use crate::models::JobPosting;

/// The outcome of scoring one candidate skill set against one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    /// Integer in 0..=100, round-half-up. Cannot exceed 100 by construction
    /// (the numerator never exceeds the denominator).
    pub score: u32,
    pub matching_skills: BTreeSet<String>,
}

/// Ephemeral match result for one (candidate, job) pair. Recomputed on
/// demand, never persisted; a pure function of the inputs at computation
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub score: u32,
    pub matching_skills: BTreeSet<String>,
}

/// Algorithm A: tag-overlap score.
///
/// `matching = normalized(job.tags) ∩ skills`, scored against the size of
/// the tag set. Empty tag set scores 0 rather than dividing by zero.
pub fn score_by_tags(skills: &BTreeSet<String>, job: &JobPosting) -> MatchScore {
    let job_tags: BTreeSet<String> = job.tags.iter().map(|t| normalize(t)).collect();
    if job_tags.is_empty() {
        return MatchScore {
            score: 0,
            matching_skills: BTreeSet::new(),
        };
    }

    let matching: BTreeSet<String> = job_tags.intersection(skills).cloned().collect();
    MatchScore {
        score: ratio_score(matching.len(), job_tags.len()),
        matching_skills: matching,
    }
}

/// Algorithm B: text-containment score.
///
/// Each candidate skill counts when its phrase occurs in the normalized
/// requirements + description prose, scored against the size of the skill
/// set (denominator floored at 1, so an empty skill set scores 0).
pub fn score_by_prose(skills: &BTreeSet<String>, job: &JobPosting) -> MatchScore {
    let text = normalize(&format!("{} {}", job.requirements, job.description));

    let matching: BTreeSet<String> = skills
        .iter()
        .filter(|skill| text.contains(skill.as_str()))
        .cloned()
        .collect();

    MatchScore {
        score: ratio_score(matching.len(), skills.len().max(1)),
        matching_skills: matching,
    }
}

/// `round(100 * numerator / denominator)`, standard round-half-up.
fn ratio_score(numerator: usize, denominator: usize) -> u32 {
    (100.0 * numerator as f64 / denominator as f64).round() as u32
}
