//! Job source for the worker pool
//!
//! The URL list is fixed up front and consumed destructively: each job is
//! handed to exactly one worker, once.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

/// One URL to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Position in the original URL list
    pub seq: usize,
    pub url: String,
}

/// Single-pass queue of jobs shared by all workers
///
/// The lock is only held for the pop itself, never across an `.await`.
#[derive(Debug)]
pub struct JobSource {
    queue: Mutex<VecDeque<Job>>,
    total: usize,
    drained: Notify,
}

impl JobSource {
    pub fn new<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let queue: VecDeque<Job> = urls
            .into_iter()
            .enumerate()
            .map(|(seq, url)| Job { seq, url })
            .collect();
        let total = queue.len();

        Self {
            queue: Mutex::new(queue),
            total,
            drained: Notify::new(),
        }
    }

    /// Takes the next job, or `None` once every job has been handed out
    pub fn next_job(&self) -> Option<Job> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let job = queue.pop_front();
        if queue.is_empty() {
            self.drained.notify_one();
        }
        job
    }

    /// Number of jobs the source started with
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of jobs not yet handed out
    pub fn remaining(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Resolves once every job has been handed out
    pub async fn drained(&self) {
        if self.is_empty() {
            return;
        }
        self.drained.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{}", i)).collect()
    }

    #[test]
    fn test_jobs_in_order() {
        let source = JobSource::new(urls(3));

        assert_eq!(source.total(), 3);
        assert_eq!(source.next_job().unwrap().seq, 0);
        assert_eq!(source.next_job().unwrap().url, "https://example.com/1");
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_job().unwrap().seq, 2);
        assert!(source.next_job().is_none());
        assert!(source.next_job().is_none());
        assert_eq!(source.total(), 3);
    }

    #[test]
    fn test_empty_source() {
        let source = JobSource::new(Vec::new());
        assert!(source.is_empty());
        assert!(source.next_job().is_none());
    }

    #[test]
    fn test_concurrent_pulls_deliver_each_job_once() {
        let source = Arc::new(JobSource::new(urls(500)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(job) = source.next_job() {
                        seen.push(job.seq);
                    }
                    seen
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }

        assert_eq!(all.len(), 500);
        let unique: HashSet<_> = all.into_iter().collect();
        assert_eq!(unique.len(), 500);
    }

    #[tokio::test]
    async fn test_drained_resolves_after_last_pull() {
        let source = Arc::new(JobSource::new(urls(2)));

        let waiter = {
            let source = Arc::clone(&source);
            tokio::spawn(async move { source.drained().await })
        };

        source.next_job();
        source.next_job();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("drained should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_drained_resolves_immediately_when_empty() {
        let source = JobSource::new(Vec::new());
        tokio::time::timeout(Duration::from_secs(1), source.drained())
            .await
            .expect("empty source is already drained");
    }
}
