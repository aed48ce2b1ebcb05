//! PostgreSQL repositories over the shared sqlx pool.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE candidate_profiles (
//!     id UUID PRIMARY KEY, full_name TEXT NOT NULL, email TEXT NOT NULL,
//!     parsed_text TEXT, skills TEXT[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL, updated_at TIMESTAMPTZ NOT NULL);
//! CREATE TABLE job_postings (
//!     id UUID PRIMARY KEY, title TEXT NOT NULL, company TEXT,
//!     description TEXT NOT NULL, requirements TEXT NOT NULL,
//!     location TEXT NOT NULL, tags TEXT[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL);
//! CREATE TABLE applications (
//!     id UUID PRIMARY KEY, candidate_id UUID NOT NULL, job_id UUID NOT NULL,
//!     cover_letter TEXT, created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL);
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::{Application, CandidateProfile, JobPosting};
use crate::store::{ApplicationRepo, CandidateRepo, JobRepo};

pub struct PgCandidateRepo {
    pool: PgPool,
}

impl PgCandidateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn candidate_from_row(row: PgRow) -> Result<CandidateProfile, sqlx::Error> {
    let skills: Vec<String> = row.try_get("skills")?;
    Ok(CandidateProfile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        parsed_text: row.try_get("parsed_text")?,
        skills: skills.into_iter().collect::<BTreeSet<String>>(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CandidateRepo for PgCandidateRepo {
    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>, EngineError> {
        let row = sqlx::query(
            "SELECT id, full_name, email, parsed_text, skills, created_at, updated_at
             FROM candidate_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(candidate_from_row)
            .transpose()
            .map_err(EngineError::Database)
    }

    async fn insert(&self, candidate: CandidateProfile) -> Result<(), EngineError> {
        sqlx::query(
            "INSERT INTO candidate_profiles
                 (id, full_name, email, parsed_text, skills, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(candidate.id)
        .bind(&candidate.full_name)
        .bind(&candidate.email)
        .bind(&candidate.parsed_text)
        .bind(candidate.skills.iter().cloned().collect::<Vec<String>>())
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_cv_results(
        &self,
        id: Uuid,
        parsed_text: &str,
        skills: &BTreeSet<String>,
    ) -> Result<(), EngineError> {
        // Single UPDATE doing the set union in SQL, so concurrent
        // completions for the same candidate cannot lose skills to a blind
        // overwrite.
        let result = sqlx::query(
            "UPDATE candidate_profiles
             SET parsed_text = $2,
                 skills = ARRAY(SELECT DISTINCT s FROM unnest(skills || $3::text[]) AS s ORDER BY s),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(parsed_text)
        .bind(skills.iter().cloned().collect::<Vec<String>>())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Candidate {id} not found")));
        }
        Ok(())
    }
}

pub struct PgJobRepo {
    pool: PgPool,
}

impl PgJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: PgRow) -> Result<JobPosting, sqlx::Error> {
    Ok(JobPosting {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        description: row.try_get("description")?,
        requirements: row.try_get("requirements")?,
        location: row.try_get("location")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
    })
}

const JOB_COLUMNS: &str = "id, title, company, description, requirements, location, tags, created_at";

#[async_trait]
impl JobRepo for PgJobRepo {
    async fn get(&self, id: Uuid) -> Result<Option<JobPosting>, EngineError> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(job_from_row)
            .transpose()
            .map_err(EngineError::Database)
    }

    async fn insert(&self, job: JobPosting) -> Result<(), EngineError> {
        sqlx::query(
            "INSERT INTO job_postings
                 (id, title, company, description, requirements, location, tags, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.location)
        .bind(&job.tags)
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<JobPosting>, EngineError> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| job_from_row(row).map_err(EngineError::Database))
            .collect()
    }
}

pub struct PgApplicationRepo {
    pool: PgPool,
}

impl PgApplicationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn application_from_row(row: PgRow) -> Result<Application, sqlx::Error> {
    Ok(Application {
        id: row.try_get("id")?,
        candidate_id: row.try_get("candidate_id")?,
        job_id: row.try_get("job_id")?,
        cover_letter: row.try_get("cover_letter")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ApplicationRepo for PgApplicationRepo {
    async fn get(&self, id: Uuid) -> Result<Option<Application>, EngineError> {
        let row = sqlx::query(
            "SELECT id, candidate_id, job_id, cover_letter, created_at, updated_at
             FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(application_from_row)
            .transpose()
            .map_err(EngineError::Database)
    }

    async fn insert(&self, application: Application) -> Result<(), EngineError> {
        sqlx::query(
            "INSERT INTO applications
                 (id, candidate_id, job_id, cover_letter, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(&application.cover_letter)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_cover_letter(&self, id: Uuid, letter: &str) -> Result<(), EngineError> {
        let result = sqlx::query(
            "UPDATE applications SET cover_letter = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(letter)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Application {id} not found")));
        }
        Ok(())
    }
}
