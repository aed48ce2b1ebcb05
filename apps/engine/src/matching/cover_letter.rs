use crate::models::{CandidateProfile, JobPosting};

/// Composes a cover letter by deterministic template substitution.
///
/// Interpolates the candidate's full name and email, the job title, the
/// company name ("Company" when unknown), and the comma-joined skill list.
/// Always returns a complete, grammatically closed letter; no external call
/// is needed for correctness. An external generative service may replace
/// this transparently, but this template is the mandatory fallback.
pub fn compose(candidate: &CandidateProfile, job: &JobPosting) -> String {
    let company = job.company_or_placeholder();

    let skills_sentence = if candidate.skills.is_empty() {
        "a track record of learning new technologies quickly".to_string()
    } else {
        format!("hands-on experience with {}", candidate.skill_list())
    };

    format!(
        "Dear Hiring Manager,\n\n\
         I am writing to express my interest in the {title} position at {company}. \
         After reviewing the role, I believe my background is a strong fit for \
         what your team is looking for.\n\n\
         I bring {skills_sentence}, and I am confident I can contribute to \
         {company} from day one. The responsibilities described in the {title} \
         posting align closely with the work I enjoy most.\n\n\
         I would welcome the opportunity to discuss how I can support your team. \
         Thank you for your time and consideration.\n\n\
         Sincerely,\n\
         {name}\n\
         {email}\n",
        title = job.title,
        company = company,
        skills_sentence = skills_sentence,
        name = candidate.full_name,
        email = candidate.email,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_skills(skills: &[&str]) -> CandidateProfile {
        let mut candidate = CandidateProfile::new("Grace Hopper", "grace@example.com");
        candidate.skills = skills.iter().map(|s| s.to_string()).collect();
        candidate
    }

    #[test]
    fn test_letter_contains_name_and_title_verbatim() {
        let candidate = candidate_with_skills(&["rust", "sql"]);
        let mut job = JobPosting::new("Staff Backend Engineer");
        job.company = Some("Initech".to_string());

        let letter = compose(&candidate, &job);
        assert!(!letter.is_empty());
        assert!(letter.contains("Grace Hopper"));
        assert!(letter.contains("Staff Backend Engineer"));
        assert!(letter.contains("Initech"));
        assert!(letter.contains("grace@example.com"));
    }

    #[test]
    fn test_unknown_company_uses_placeholder() {
        let candidate = candidate_with_skills(&["rust"]);
        let job = JobPosting::new("Backend Engineer");
        let letter = compose(&candidate, &job);
        assert!(letter.contains("Company"));
    }

    #[test]
    fn test_skills_are_comma_joined_into_letter() {
        let candidate = candidate_with_skills(&["python", "sql"]);
        let letter = compose(&candidate, &JobPosting::new("Data Engineer"));
        assert!(letter.contains("python, sql"));
    }

    #[test]
    fn test_empty_skill_set_still_produces_closed_letter() {
        let candidate = candidate_with_skills(&[]);
        let letter = compose(&candidate, &JobPosting::new("Junior Engineer"));
        assert!(letter.contains("learning new technologies"));
        assert!(letter.trim_end().ends_with("grace@example.com"));
        assert!(letter.starts_with("Dear Hiring Manager,"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let candidate = candidate_with_skills(&["rust"]);
        let job = JobPosting::new("Backend Engineer");
        assert_eq!(compose(&candidate, &job), compose(&candidate, &job));
    }
}
