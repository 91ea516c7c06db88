//! Message Provider: resolves the body text of each slide.
//!
//! Text comes from an external [`Generate`] capability. Failures never leave
//! this module: every error is logged and replaced by a fixed fallback line,
//! so callers always receive displayable text.
//!
//! Results are memoized per slide. Each slide (and the batch request) has a
//! single-flight guard: while a generation is outstanding, later callers
//! share it instead of issuing another call.

mod error;
mod gemini;
mod generate;
pub mod script;

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use generate::{Generate, GenerationRequest, OfflineGenerator, Schema, SchemaType};
use script::{BATCH_FALLBACKS, BATCH_PROMPT, FALLBACKS, SLIDE_COUNT};

/// An outstanding resolution, owned by whoever drives it to completion.
pub type Fetch = BoxFuture<'static, Resolution>;

/// The outcome of a [`Fetch`], handed back through [`MessageProvider::fulfil`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    One { index: usize, text: String },
    All(Vec<String>),
}

type SharedText = Shared<BoxFuture<'static, String>>;
type SharedBatch = Shared<BoxFuture<'static, Vec<String>>>;

enum Slot {
    Empty,
    Pending(SharedText),
    Resolved(String),
}

pub struct MessageProvider {
    generator: Arc<dyn Generate>,
    slots: Vec<Slot>,
    batch: Option<SharedBatch>,
    requests_issued: usize,
}

impl MessageProvider {
    pub fn new(generator: Arc<dyn Generate>) -> Self {
        Self {
            generator,
            slots: (0..SLIDE_COUNT).map(|_| Slot::Empty).collect(),
            batch: None,
            requests_issued: 0,
        }
    }

    pub fn message(&self, index: usize) -> Option<&str> {
        match self.slots.get(index) {
            Some(Slot::Resolved(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_resolved(&self, index: usize) -> bool {
        self.message(index).is_some()
    }

    /// True while a generation covering `index` has been issued but not fulfilled.
    pub fn is_pending(&self, index: usize) -> bool {
        match self.slots.get(index) {
            Some(Slot::Pending(_)) => true,
            Some(Slot::Empty) => self.batch.is_some(),
            _ => false,
        }
    }

    /// Number of external generation calls issued so far.
    pub fn requests_issued(&self) -> usize {
        self.requests_issued
    }

    /// Start resolving one slide.
    ///
    /// Returns `None` when nothing needs to be driven: the slide is already
    /// resolved, a fetch for it is outstanding, or a batch covers it.
    pub fn request(&mut self, index: usize) -> Option<Fetch> {
        if index >= SLIDE_COUNT || self.batch.is_some() {
            return None;
        }
        if !matches!(self.slots[index], Slot::Empty) {
            return None;
        }
        let shared = self.start_one(index);
        Some(shared.map(move |text| Resolution::One { index, text }).boxed())
    }

    /// Start resolving every slide with one structured call.
    ///
    /// Returns `None` if a batch is already outstanding or every slide is
    /// already resolved.
    pub fn request_all(&mut self) -> Option<Fetch> {
        if self.batch.is_some() || self.slots.iter().all(|s| matches!(s, Slot::Resolved(_))) {
            return None;
        }
        let shared = self.start_batch();
        Some(shared.map(Resolution::All).boxed())
    }

    /// Store a finished resolution. Resolved slides are never overwritten.
    pub fn fulfil(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::One { index, text } => {
                if let Some(slot) = self.slots.get_mut(index) {
                    if !matches!(slot, Slot::Resolved(_)) {
                        *slot = Slot::Resolved(text);
                    }
                }
            }
            Resolution::All(texts) => {
                self.batch = None;
                for (slot, text) in self.slots.iter_mut().zip(texts) {
                    if !matches!(slot, Slot::Resolved(_)) {
                        *slot = Slot::Resolved(text);
                    }
                }
            }
        }
    }

    /// Resolve one slide, waiting for the generation if needed.
    ///
    /// A second call for the same index is served from the cache.
    pub async fn resolve(&mut self, index: usize) -> String {
        if index >= SLIDE_COUNT {
            return String::new();
        }
        if let Some(text) = self.message(index) {
            debug!(index, "slide text served from cache");
            return text.to_string();
        }
        if let Some(batch) = self.batch.clone() {
            let texts = batch.await;
            self.fulfil(Resolution::All(texts));
        } else {
            let outstanding = match &self.slots[index] {
                Slot::Pending(shared) => Some(shared.clone()),
                _ => None,
            };
            let shared = match outstanding {
                Some(shared) => shared,
                None => self.start_one(index),
            };
            let text = shared.await;
            self.fulfil(Resolution::One { index, text });
        }
        self.message(index).unwrap_or(FALLBACKS[index]).to_string()
    }

    /// Resolve every slide at once. Always returns exactly `SLIDE_COUNT` texts.
    pub async fn resolve_all(&mut self) -> Vec<String> {
        if let Some(fetch) = self.request_all() {
            let resolution = fetch.await;
            self.fulfil(resolution);
        } else if let Some(batch) = self.batch.clone() {
            let texts = batch.await;
            self.fulfil(Resolution::All(texts));
        }
        (0..SLIDE_COUNT)
            .map(|i| self.message(i).unwrap_or(BATCH_FALLBACKS[i]).to_string())
            .collect()
    }

    fn start_one(&mut self, index: usize) -> SharedText {
        self.requests_issued += 1;
        let generator = Arc::clone(&self.generator);
        let shared = async move { generate_slide(generator.as_ref(), index).await }
            .boxed()
            .shared();
        self.slots[index] = Slot::Pending(shared.clone());
        shared
    }

    fn start_batch(&mut self) -> SharedBatch {
        self.requests_issued += 1;
        let generator = Arc::clone(&self.generator);
        let shared = async move { generate_batch(generator.as_ref()).await }
            .boxed()
            .shared();
        self.batch = Some(shared.clone());
        shared
    }
}

async fn generate_slide(generator: &dyn Generate, index: usize) -> String {
    let request = GenerationRequest::text(script::slide_prompt(index));
    let result = match generator.generate(&request).await {
        Ok(text) if text.trim().is_empty() => Err(GenerationError::Empty),
        other => other,
    };
    match result {
        Ok(text) => {
            info!(index, "slide text generated");
            text.trim().to_string()
        }
        Err(error) => {
            warn!(index, %error, "slide generation failed, using fallback");
            FALLBACKS[index].to_string()
        }
    }
}

async fn generate_batch(generator: &dyn Generate) -> Vec<String> {
    let request = GenerationRequest::structured(BATCH_PROMPT, Schema::string_array());
    let result = match generator.generate(&request).await {
        Ok(raw) => parse_batch(&raw),
        Err(error) => Err(error),
    };
    match result {
        Ok(texts) => {
            info!(count = texts.len(), "letter generated in one batch");
            texts
        }
        Err(error) => {
            warn!(%error, "batch generation failed, using fallback letter");
            BATCH_FALLBACKS.iter().map(|s| s.to_string()).collect()
        }
    }
}

/// Parse a structured batch payload into exactly `SLIDE_COUNT` non-empty lines.
///
/// Any deviation rejects the whole payload.
pub fn parse_batch(raw: &str) -> Result<Vec<String>, GenerationError> {
    let body = strip_code_fence(raw.trim());
    let texts: Vec<String> =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if texts.len() != SLIDE_COUNT {
        return Err(GenerationError::Malformed(format!(
            "expected {SLIDE_COUNT} lines, got {}",
            texts.len()
        )));
    }
    if texts.iter().any(|t| t.trim().is_empty()) {
        return Err(GenerationError::Malformed("empty line in batch".into()));
    }
    Ok(texts.into_iter().map(|t| t.trim().to_string()).collect())
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;

    /// Replies from a script, counting every call.
    struct Scripted {
        replies: Mutex<Vec<Result<String, GenerationError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generate for Scripted {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(GenerationError::Disabled)
            } else {
                replies.remove(0)
            }
        }
    }

    /// Blocks until released, so a call can be observed mid-flight.
    struct Gated {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generate for Gated {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok("despacio".into())
        }
    }

    fn six_lines() -> String {
        serde_json::to_string(&["a", "b", "c", "d", "e", "f"]).unwrap()
    }

    #[tokio::test]
    async fn resolve_is_memoized() {
        let generator = Scripted::new(vec![Ok("  Siempre tú.  ".into())]);
        let mut provider = MessageProvider::new(generator.clone());

        let first = provider.resolve(2).await;
        let second = provider.resolve(2).await;

        assert_eq!(first, "Siempre tú.");
        assert_eq!(first, second);
        assert_eq!(generator.calls(), 1);
        assert_eq!(provider.requests_issued(), 1);
    }

    #[tokio::test]
    async fn failure_yields_slide_fallback() {
        let generator = Scripted::new(vec![Err(GenerationError::Malformed("x".into()))]);
        let mut provider = MessageProvider::new(generator);

        assert_eq!(provider.resolve(4).await, FALLBACKS[4]);
    }

    #[tokio::test]
    async fn blank_response_yields_slide_fallback() {
        let generator = Scripted::new(vec![Ok("   \n".into())]);
        let mut provider = MessageProvider::new(generator);

        assert_eq!(provider.resolve(1).await, FALLBACKS[1]);
    }

    #[tokio::test]
    async fn out_of_range_request_is_ignored() {
        let mut provider = MessageProvider::new(Scripted::new(vec![]));
        assert!(provider.request(SLIDE_COUNT).is_none());
        assert_eq!(provider.requests_issued(), 0);
    }

    #[tokio::test]
    async fn second_request_while_in_flight_is_suppressed() {
        let generator = Arc::new(Gated {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let mut provider = MessageProvider::new(generator.clone());

        let fetch = provider.request(0).expect("first request starts a fetch");
        assert!(provider.request(0).is_none());
        assert!(provider.is_pending(0));

        let handle = tokio::spawn(fetch);
        tokio::task::yield_now().await;
        generator.release.notify_one();
        let resolution = handle.await.unwrap();
        provider.fulfil(resolution);

        assert_eq!(provider.message(0), Some("despacio"));
        assert!(!provider.is_pending(0));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_joins_an_outstanding_fetch() {
        let generator = Scripted::new(vec![Ok("una vez".into()), Ok("dos veces".into())]);
        let mut provider = MessageProvider::new(generator.clone());

        let _outstanding = provider.request(3).unwrap();
        assert_eq!(provider.resolve(3).await, "una vez");
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn fulfil_never_overwrites() {
        let mut provider = MessageProvider::new(Scripted::new(vec![]));
        provider.fulfil(Resolution::One {
            index: 0,
            text: "primero".into(),
        });
        provider.fulfil(Resolution::One {
            index: 0,
            text: "segundo".into(),
        });
        assert_eq!(provider.message(0), Some("primero"));
    }

    #[tokio::test]
    async fn batch_success_fills_every_slide() {
        let generator = Scripted::new(vec![Ok(six_lines())]);
        let mut provider = MessageProvider::new(generator.clone());

        let texts = provider.resolve_all().await;

        assert_eq!(texts, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(provider.message(5), Some("f"));
        assert!(provider.request_all().is_none());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn batch_wrong_length_falls_back_wholesale() {
        let generator = Scripted::new(vec![Ok(r#"["uno", "dos"]"#.into())]);
        let mut provider = MessageProvider::new(generator);

        let texts = provider.resolve_all().await;

        assert_eq!(texts.len(), SLIDE_COUNT);
        assert_eq!(texts, BATCH_FALLBACKS.to_vec());
    }

    #[tokio::test]
    async fn batch_call_failure_falls_back_wholesale() {
        let mut provider = MessageProvider::new(Scripted::new(vec![Err(GenerationError::Disabled)]));
        assert_eq!(provider.resolve_all().await, BATCH_FALLBACKS.to_vec());
    }

    #[tokio::test]
    async fn slide_requests_are_covered_by_outstanding_batch() {
        let generator = Scripted::new(vec![Ok(six_lines())]);
        let mut provider = MessageProvider::new(generator.clone());

        let batch = provider.request_all().unwrap();
        assert!(provider.request(2).is_none());
        assert!(provider.is_pending(2));

        provider.fulfil(batch.await);
        assert_eq!(provider.resolve(2).await, "c");
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn parse_batch_accepts_fenced_json() {
        let raw = format!("```json\n{}\n```", six_lines());
        assert_eq!(parse_batch(&raw).unwrap().len(), SLIDE_COUNT);
    }

    #[test]
    fn parse_batch_rejects_blank_entries_and_garbage() {
        assert!(parse_batch(r#"["a","b","c","d","e"," "]"#).is_err());
        assert!(parse_batch("no es json").is_err());
        assert!(parse_batch(r#"{"a": 1}"#).is_err());
    }
}
