use chrono::Utc;

use crate::config::{ModcraftConfig, MOD_NAME_CHARS};
use crate::error::{ModcraftError, Result};
use crate::models::{GeneratedMod, JobFailure, JobHandle, JobPayload, ModStatus};
use crate::util::truncate_chars;

/// Newest-first collection of generation jobs.
#[derive(Debug)]
pub struct JobTracker {
    jobs: Vec<GeneratedMod>,
    next_handle: u64,
    default_version: String,
    minecraft_version: String,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new(&ModcraftConfig::default())
    }
}

impl JobTracker {
    pub fn new(config: &ModcraftConfig) -> Self {
        Self {
            jobs: Vec::new(),
            next_handle: 0,
            default_version: config.default_mod_version.clone(),
            minecraft_version: config.minecraft_version.clone(),
        }
    }

    fn allocate_handle(&mut self) -> JobHandle {
        self.next_handle += 1;
        JobHandle(self.next_handle)
    }

    /// Insert a new job at the head with status `generating`.
    pub fn create(&mut self, description: &str) -> JobHandle {
        let handle = self.allocate_handle();
        let now = Utc::now();
        let job = GeneratedMod {
            handle,
            id: format!("tmp-{}-{}", now.timestamp_millis(), handle),
            remote_id: None,
            name: truncate_chars(description, MOD_NAME_CHARS),
            description: description.to_string(),
            version: self.default_version.clone(),
            minecraft_version: self.minecraft_version.clone(),
            timestamp: now,
            status: ModStatus::Generating,
            failure: None,
            payload: None,
            texture_url: None,
        };
        self.jobs.insert(0, job);
        handle
    }

    pub fn get(&self, handle: JobHandle) -> Option<&GeneratedMod> {
        self.jobs.iter().find(|j| j.handle == handle)
    }

    fn get_mut(&mut self, handle: JobHandle) -> Result<&mut GeneratedMod> {
        self.jobs
            .iter_mut()
            .find(|j| j.handle == handle)
            .ok_or(ModcraftError::JobNotFound(handle.0))
    }

    pub fn find_by_remote_id(&self, remote_id: &str) -> Option<&GeneratedMod> {
        self.jobs
            .iter()
            .find(|j| j.remote_id.as_deref() == Some(remote_id))
    }

    pub fn update_status(&mut self, handle: JobHandle, status: ModStatus) -> Result<()> {
        let job = self.get_mut(handle)?;
        if !job.status.can_transition_to(status) {
            return Err(ModcraftError::InvalidTransition {
                from: job.status.to_string(),
                to: status.to_string(),
            });
        }
        job.status = status;
        Ok(())
    }

    /// Record the server-issued id. The display id follows it; the handle
    /// stays the lookup key.
    pub fn assign_remote_id(&mut self, handle: JobHandle, remote_id: &str) -> Result<()> {
        let job = self.get_mut(handle)?;
        job.remote_id = Some(remote_id.to_string());
        job.id = remote_id.to_string();
        Ok(())
    }

    pub fn attach_result(&mut self, handle: JobHandle, payload: JobPayload) -> Result<()> {
        self.get_mut(handle)?.payload = Some(payload);
        Ok(())
    }

    pub fn attach_preview(&mut self, handle: JobHandle, texture_url: &str) -> Result<()> {
        self.get_mut(handle)?.texture_url = Some(texture_url.to_string());
        Ok(())
    }

    /// Move a job to `error` with the reason attached.
    pub fn fail(&mut self, handle: JobHandle, failure: JobFailure) -> Result<()> {
        self.update_status(handle, ModStatus::Error)?;
        self.get_mut(handle)?.failure = Some(failure);
        Ok(())
    }

    pub fn list(&self) -> &[GeneratedMod] {
        &self.jobs
    }

    /// Replace every job with `mods` (kept in the given order), assigning
    /// fresh handles.
    pub fn replace_all(&mut self, mods: Vec<GeneratedMod>) {
        let mut jobs = Vec::with_capacity(mods.len());
        for mut job in mods {
            job.handle = self.allocate_handle();
            jobs.push(job);
        }
        self.jobs = jobs;
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PROMPT: &str = "Add a diamond sword with double damage";

    #[test]
    fn test_create_inserts_at_head_with_defaults() {
        let mut tracker = JobTracker::default();
        let first = tracker.create("first mod");
        let second = tracker.create(PROMPT);

        assert_eq!(tracker.list()[0].handle, second);
        assert_eq!(tracker.list()[1].handle, first);

        let job = tracker.get(second).unwrap();
        assert_eq!(job.status, ModStatus::Generating);
        assert_eq!(job.name, "Add a diamond sword with doubl");
        assert_eq!(job.name.chars().count(), 30);
        assert_eq!(job.description, PROMPT);
        assert_eq!(job.version, "1.0.0");
        assert_eq!(job.minecraft_version, "1.20.1");
        assert!(job.id.starts_with("tmp-"));
    }

    #[test]
    fn test_remote_id_does_not_break_lookup() {
        let mut tracker = JobTracker::default();
        let handle = tracker.create(PROMPT);
        tracker.assign_remote_id(handle, "m1").unwrap();
        tracker.update_status(handle, ModStatus::CodeGenerated).unwrap();

        let job = tracker.find_by_remote_id("m1").unwrap();
        assert_eq!(job.handle, handle);
        assert_eq!(job.id, "m1");
        assert_eq!(job.status, ModStatus::CodeGenerated);
    }

    #[test]
    fn test_rejects_regression() {
        let mut tracker = JobTracker::default();
        let handle = tracker.create(PROMPT);
        tracker.update_status(handle, ModStatus::Compiling).unwrap();

        let err = tracker
            .update_status(handle, ModStatus::TexturesGenerating)
            .unwrap_err();
        assert!(matches!(err, ModcraftError::InvalidTransition { .. }));
        assert_eq!(tracker.get(handle).unwrap().status, ModStatus::Compiling);
    }

    #[test]
    fn test_fail_records_kind() {
        let mut tracker = JobTracker::default();
        let handle = tracker.create(PROMPT);
        tracker
            .fail(
                handle,
                JobFailure {
                    kind: ErrorKind::Network,
                    message: "connection reset".into(),
                },
            )
            .unwrap();

        let job = tracker.get(handle).unwrap();
        assert_eq!(job.status, ModStatus::Error);
        assert_eq!(job.failure.as_ref().unwrap().kind, ErrorKind::Network);
        assert!(tracker.update_status(handle, ModStatus::Ready).is_err());
    }

    #[test]
    fn test_unknown_handle() {
        let mut tracker = JobTracker::default();
        let err = tracker
            .update_status(JobHandle(42), ModStatus::Ready)
            .unwrap_err();
        assert!(matches!(err, ModcraftError::JobNotFound(42)));
    }

    #[test]
    fn test_replace_all_reassigns_handles() {
        let mut tracker = JobTracker::default();
        let old = tracker.create("old");
        let mut a = tracker.get(old).unwrap().clone();
        a.id = "a".into();
        let mut b = a.clone();
        b.id = "b".into();

        tracker.replace_all(vec![a, b]);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.list()[0].id, "a");
        assert_ne!(tracker.list()[0].handle, tracker.list()[1].handle);
        assert!(tracker.get(old).is_none());
    }
}
