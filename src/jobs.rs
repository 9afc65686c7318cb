use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::debug;

use crate::batch::BatchOutput;

pub type JobId = u64;

#[derive(Clone, Debug)]
pub enum JobState {
    Running { processed: usize, total: usize },
    Done(Arc<BatchOutput>),
    Failed(String),
}

impl JobState {
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running { .. })
    }
}

struct Inner {
    next_id: JobId,
    jobs: BTreeMap<JobId, JobState>,
}

/// Batches submitted from the page, polled for progress until they finish.
pub struct JobStore {
    max_jobs: usize,
    inner: Mutex<Inner>,
}

impl JobStore {
    pub fn new(max_jobs: usize) -> Self {
        Self {
            max_jobs: max_jobs.max(1),
            inner: Mutex::new(Inner {
                next_id: 1,
                jobs: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, total: usize) -> JobId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.jobs.insert(
            id,
            JobState::Running {
                processed: 0,
                total,
            },
        );

        // Oldest finished jobs go first; running ones are never dropped.
        while inner.jobs.len() > self.max_jobs {
            let victim = inner
                .jobs
                .iter()
                .find(|(_, state)| !state.is_running())
                .map(|(id, _)| *id);
            match victim {
                Some(old) => {
                    debug!("dropping job {old}");
                    inner.jobs.remove(&old);
                }
                None => break,
            }
        }
        id
    }

    pub fn set_progress(&self, id: JobId, processed: usize) {
        if let Some(JobState::Running { processed: p, .. }) = self.lock().jobs.get_mut(&id) {
            *p = processed;
        }
    }

    pub fn finish(&self, id: JobId, result: Result<BatchOutput, String>) {
        let state = match result {
            Ok(output) => JobState::Done(Arc::new(output)),
            Err(message) => JobState::Failed(message),
        };
        if let Some(slot) = self.lock().jobs.get_mut(&id) {
            *slot = state;
        }
    }

    pub fn get(&self, id: JobId) -> Option<JobState> {
        self.lock().jobs.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> BatchOutput {
        BatchOutput {
            videos: Vec::new(),
            transcripts: Some(String::new()),
            comments: None,
        }
    }

    #[test]
    fn lifecycle() {
        let store = JobStore::new(4);
        let id = store.create(3);
        assert!(matches!(
            store.get(id),
            Some(JobState::Running {
                processed: 0,
                total: 3
            })
        ));

        store.set_progress(id, 2);
        assert!(matches!(
            store.get(id),
            Some(JobState::Running { processed: 2, .. })
        ));

        store.finish(id, Ok(output()));
        assert!(matches!(store.get(id), Some(JobState::Done(_))));

        // progress after completion is ignored
        store.set_progress(id, 3);
        assert!(matches!(store.get(id), Some(JobState::Done(_))));
    }

    #[test]
    fn failures_keep_the_message() {
        let store = JobStore::new(4);
        let id = store.create(1);
        store.finish(id, Err("boom".into()));
        match store.get(id) {
            Some(JobState::Failed(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ids_increase() {
        let store = JobStore::new(4);
        let a = store.create(1);
        let b = store.create(1);
        assert!(b > a);
        assert!(store.get(999).is_none());
    }

    #[test]
    fn evicts_oldest_finished_but_never_running() {
        let store = JobStore::new(2);
        let running = store.create(1);
        let done = store.create(1);
        store.finish(done, Ok(output()));

        let newest = store.create(1);
        assert_eq!(store.len(), 2);
        assert!(store.get(running).is_some());
        assert!(store.get(done).is_none());
        assert!(store.get(newest).is_some());

        // only running jobs left: the store grows rather than dropping work
        let extra = store.create(1);
        assert_eq!(store.len(), 3);
        assert!(store.get(extra).is_some());
    }
}
