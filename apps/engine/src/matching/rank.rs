use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::scorer::score_by_tags;
use crate::models::JobPosting;

/// One entry in a candidate's recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    pub job_id: Uuid,
    pub title: String,
    pub score: u32,
    pub matching_skills: BTreeSet<String>,
}

/// Ranks jobs for a candidate by tag-overlap score (Algorithm A — tags are
/// the authority here), descending. The sort is stable: ties keep the input
/// order, which callers supply as job creation order.
pub fn rank_jobs(skills: &BTreeSet<String>, jobs: &[JobPosting]) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = jobs
        .iter()
        .map(|job| {
            let score = score_by_tags(skills, job);
            RankedJob {
                job_id: job.id,
                title: job.title.clone(),
                score: score.score,
                matching_skills: score.matching_skills,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn job(title: &str, tags: &[&str]) -> JobPosting {
        let mut job = JobPosting::new(title);
        job.tags = tags.iter().map(|t| t.to_string()).collect();
        job
    }

    #[test]
    fn test_ranks_by_score_descending() {
        let jobs = vec![
            job("Half match", &["react", "aws"]),
            job("Full match", &["react"]),
            job("No match", &["cobol"]),
        ];
        let ranked = rank_jobs(&skills(&["react"]), &jobs);
        assert_eq!(ranked[0].title, "Full match");
        assert_eq!(ranked[1].title, "Half match");
        assert_eq!(ranked[2].title, "No match");
        assert_eq!(ranked[0].score, 100);
        assert_eq!(ranked[2].score, 0);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let jobs = vec![
            job("Posted first", &["react"]),
            job("Posted second", &["react"]),
            job("Posted third", &["react"]),
        ];
        let ranked = rank_jobs(&skills(&["react"]), &jobs);
        let titles: Vec<_> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Posted first", "Posted second", "Posted third"]);
    }

    #[test]
    fn test_empty_job_list_yields_empty_ranking() {
        assert!(rank_jobs(&skills(&["react"]), &[]).is_empty());
    }
}
