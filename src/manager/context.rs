use crate::transaction::TransactionMeta;
use std::fmt;

pub const META_COLLECTOR_ID: &str = "collector_id";
pub const META_JOB_TASK_ID: &str = "job_task_id";
pub const META_SECRET_ID: &str = "secret.secret_id";

/// The context field whose absence made an operation a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingContext {
    CollectorId,
    JobTaskId,
    SecretId,
}

impl fmt::Display for MissingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingContext::CollectorId => write!(f, "collector_id"),
            MissingContext::JobTaskId => write!(f, "job_task_id"),
            MissingContext::SecretId => write!(f, "secret_id"),
        }
    }
}

/// Identity of the collection run a store works on behalf of.
///
/// Blank strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionContext {
    collector_id: Option<String>,
    job_task_id: Option<String>,
    secret_id: Option<String>,
}

impl CollectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_meta(meta: &TransactionMeta) -> Self {
        Self {
            collector_id: non_blank(meta.get_meta(META_COLLECTOR_ID)),
            job_task_id: non_blank(meta.get_meta(META_JOB_TASK_ID)),
            secret_id: non_blank(meta.get_meta(META_SECRET_ID)),
        }
    }

    pub fn collector_id(mut self, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.collector_id = non_blank(Some(value.as_str()));
        self
    }

    pub fn job_task_id(mut self, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.job_task_id = non_blank(Some(value.as_str()));
        self
    }

    pub fn secret_id(mut self, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.secret_id = non_blank(Some(value.as_str()));
        self
    }

    pub fn get_collector_id(&self) -> Option<&str> {
        self.collector_id.as_deref()
    }

    pub fn get_job_task_id(&self) -> Option<&str> {
        self.job_task_id.as_deref()
    }

    pub fn get_secret_id(&self) -> Option<&str> {
        self.secret_id.as_deref()
    }

    pub(crate) fn require_job(&self) -> Result<&str, MissingContext> {
        self.get_job_task_id().ok_or(MissingContext::JobTaskId)
    }

    /// `(collector_id, secret_id)`
    pub(crate) fn require_source(&self) -> Result<(&str, &str), MissingContext> {
        let collector_id = self.get_collector_id().ok_or(MissingContext::CollectorId)?;
        let secret_id = self.get_secret_id().ok_or(MissingContext::SecretId)?;
        Ok((collector_id, secret_id))
    }

    /// `(collector_id, job_task_id, secret_id)`
    pub(crate) fn require_all(&self) -> Result<(&str, &str, &str), MissingContext> {
        let collector_id = self.get_collector_id().ok_or(MissingContext::CollectorId)?;
        let job_task_id = self.require_job()?;
        let secret_id = self.get_secret_id().ok_or(MissingContext::SecretId)?;
        Ok((collector_id, job_task_id, secret_id))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
