pub mod application;
pub mod candidate;
pub mod job;

pub use application::Application;
pub use candidate::CandidateProfile;
pub use job::JobPosting;
