//! In-memory storage backend and scripted prompts for tests

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::alias::RetryConfig;
use crate::error::{Error, Result};
use crate::removal::Prompt;
use crate::traits::{MultipartEntry, ObjectPage, ObjectStore, PageCursor, UploadCursor, UploadPage};

/// A remote call observed by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListObjects { prefix: String, marker: String },
    DeleteObjectsQuiet { keys: Vec<String> },
    DeleteObject { key: String },
    DeleteBucket { bucket: String },
    ListUploads { prefix: String, key_marker: String },
    Abort { key: String, upload_id: String },
}

impl Call {
    pub fn is_list_objects(&self) -> bool {
        matches!(self, Call::ListObjects { .. })
    }

    pub fn is_batch_delete(&self) -> bool {
        matches!(self, Call::DeleteObjectsQuiet { .. })
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Call::Abort { .. })
    }

    /// Whether the call changes remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::DeleteObjectsQuiet { .. }
                | Call::DeleteObject { .. }
                | Call::DeleteBucket { .. }
                | Call::Abort { .. }
        )
    }
}

#[derive(Default)]
struct BucketState {
    objects: BTreeSet<String>,
    /// Pending uploads keyed by (key, initiation sequence)
    uploads: BTreeMap<(String, u64), String>,
    /// Initiation sequence of every upload ever created, aborted ones included
    initiated: HashMap<(String, String), u64>,
}

impl BucketState {
    fn initiate(&mut self, key: &str, upload_id: &str) {
        let seq = self.initiated.len() as u64;
        self.initiated
            .insert((key.to_string(), upload_id.to_string()), seq);
        self.uploads
            .insert((key.to_string(), seq), upload_id.to_string());
    }

    /// Listing position just past the cursor's markers
    fn upload_position(&self, cursor: &UploadCursor) -> Option<(String, u64)> {
        if cursor.key_marker.is_empty() {
            return None;
        }
        let seq = if cursor.upload_id_marker.is_empty() {
            u64::MAX
        } else {
            self.initiated
                .get(&(cursor.key_marker.clone(), cursor.upload_id_marker.clone()))
                .copied()
                .unwrap_or(u64::MAX)
        };
        Some((cursor.key_marker.clone(), seq))
    }
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BucketState>,
    calls: Vec<Call>,
    /// Remaining forced failures per key for object deletes
    key_failures: HashMap<String, u32>,
    list_failures: u32,
    upload_list_failures: u32,
    bucket_failures: u32,
    abort_failures: BTreeSet<String>,
}

/// Stateful fake backend with failure injection and a call log
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock().buckets.entry(bucket.to_string()).or_default();
        self
    }

    pub fn with_objects(self, bucket: &str, keys: &[&str]) -> Self {
        {
            let mut state = self.lock();
            let b = state.buckets.entry(bucket.to_string()).or_default();
            b.objects.extend(keys.iter().map(|k| k.to_string()));
        }
        self
    }

    pub fn with_uploads(self, bucket: &str, uploads: &[(&str, &str)]) -> Self {
        {
            let mut state = self.lock();
            let b = state.buckets.entry(bucket.to_string()).or_default();
            for (key, upload_id) in uploads {
                b.initiate(key, upload_id);
            }
        }
        self
    }

    /// The next `times` delete attempts on `key` fail
    pub fn fail_key(self, key: &str, times: u32) -> Self {
        self.lock().key_failures.insert(key.to_string(), times);
        self
    }

    /// The next `times` object listing calls fail
    pub fn fail_listing(self, times: u32) -> Self {
        self.lock().list_failures = times;
        self
    }

    /// The next `times` upload listing calls fail
    pub fn fail_upload_listing(self, times: u32) -> Self {
        self.lock().upload_list_failures = times;
        self
    }

    /// The next `times` bucket deletes fail regardless of contents
    pub fn fail_bucket_delete(self, times: u32) -> Self {
        self.lock().bucket_failures = times;
        self
    }

    /// Every abort of an upload for `key` fails
    pub fn fail_abort(self, key: &str) -> Self {
        self.lock().abort_failures.insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn objects(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|b| b.objects.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pending uploads in listing order: by key, then by initiation
    pub fn uploads(&self, bucket: &str) -> Vec<(String, String)> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|b| {
                b.uploads
                    .iter()
                    .map(|((k, _), u)| (k.clone(), u.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.lock().buckets.contains_key(bucket)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn take_failure(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

fn no_such_bucket(bucket: &str) -> Error {
    Error::NotFound(format!("Bucket not found: {bucket}"))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        bucket: &str,
        cursor: &PageCursor,
        max_keys: i32,
    ) -> Result<ObjectPage> {
        let mut state = self.lock();
        state.calls.push(Call::ListObjects {
            prefix: cursor.prefix.clone(),
            marker: cursor.marker.clone(),
        });
        if take_failure(&mut state.list_failures) {
            return Err(Error::Network("injected listing failure".to_string()));
        }

        let b = state.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let mut matching = b
            .objects
            .iter()
            .filter(|k| k.starts_with(&cursor.prefix) && **k > cursor.marker);
        let keys: Vec<String> = matching.by_ref().take(max_keys as usize).cloned().collect();
        let truncated = matching.next().is_some();

        Ok(ObjectPage {
            keys,
            next_marker: None,
            truncated,
            prefix: Some(cursor.prefix.clone()),
        })
    }

    async fn delete_objects_quiet(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        let mut state = self.lock();
        state
            .calls
            .push(Call::DeleteObjectsQuiet { keys: keys.clone() });

        let State {
            buckets,
            key_failures,
            ..
        } = &mut *state;
        let b = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        let mut failed = Vec::new();
        for key in keys {
            if key_failures.get_mut(&key).is_some_and(take_failure) {
                failed.push(key);
            } else {
                b.objects.remove(&key);
            }
        }
        Ok(failed)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteObject {
            key: key.to_string(),
        });

        if state.key_failures.get_mut(key).is_some_and(take_failure) {
            return Err(Error::Network("injected delete failure".to_string()));
        }
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        b.objects.remove(key);
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteBucket {
            bucket: bucket.to_string(),
        });

        if take_failure(&mut state.bucket_failures) {
            return Err(Error::Network("injected bucket failure".to_string()));
        }
        let b = state.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        if !b.objects.is_empty() || !b.uploads.is_empty() {
            return Err(Error::Conflict(format!("BucketNotEmpty: {bucket}")));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn list_multipart_uploads(
        &self,
        bucket: &str,
        cursor: &UploadCursor,
        max_uploads: i32,
    ) -> Result<UploadPage> {
        let mut state = self.lock();
        state.calls.push(Call::ListUploads {
            prefix: cursor.prefix.clone(),
            key_marker: cursor.key_marker.clone(),
        });
        if take_failure(&mut state.upload_list_failures) {
            return Err(Error::Network("injected upload listing failure".to_string()));
        }

        let b = state.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let after = b.upload_position(cursor);
        let mut matching = b.uploads.iter().filter(|((k, seq), _)| {
            k.starts_with(&cursor.prefix)
                && after
                    .as_ref()
                    .is_none_or(|(mk, mseq)| (k, seq) > (mk, mseq))
        });
        let entries: Vec<MultipartEntry> = matching
            .by_ref()
            .take(max_uploads as usize)
            .map(|((k, _), u)| MultipartEntry::new(k, u))
            .collect();
        let truncated = matching.next().is_some();
        let last = entries.last().cloned();

        Ok(UploadPage {
            next_key_marker: last.as_ref().filter(|_| truncated).map(|e| e.key.clone()),
            next_upload_id_marker: last.filter(|_| truncated).map(|e| e.upload_id),
            entries,
            truncated,
            prefix: Some(cursor.prefix.clone()),
        })
    }

    async fn abort_multipart_upload(&self, bucket: &str, key: &str, upload_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Abort {
            key: key.to_string(),
            upload_id: upload_id.to_string(),
        });

        if state.abort_failures.contains(key) {
            return Err(Error::Network("injected abort failure".to_string()));
        }
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        let seq = b
            .initiated
            .get(&(key.to_string(), upload_id.to_string()))
            .copied();
        let pending = seq.and_then(|seq| b.uploads.remove(&(key.to_string(), seq)));
        if pending.is_none() {
            return Err(Error::NotFound(format!("NoSuchUpload: {upload_id}")));
        }
        Ok(())
    }
}

/// Prompt answering from a script and recording the questions asked
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<String>>>,
    questions: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: Arc::new(Mutex::new(
                answers.iter().map(|a| format!("{a}\n")).collect(),
            )),
            questions: Arc::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "script exhausted")
        })
    }
}

/// Retry settings without backoff delays
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
    }
}
