//! The routing orchestration.
//!
//! One entry point, [`IntentRouter::route`], with a hard contract: it
//! never fails. The pipeline is resolve thread, assemble and mask,
//! classify under timeout and retry, parse the decision, unmask and
//! inject. Any error at any stage degrades to the deterministic fallback
//! decision and the caller still gets a dispatchable outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use veilroute_classifier::parse_decision;
use veilroute_config::AppConfig;
use veilroute_core::{Classifier, ClassifierError, RoutingDecision, Turn};
use veilroute_resilience::{RetryPolicy, with_retry, with_timeout};

use crate::assembler::ContextAssembler;
use crate::inject::inject_context;
use crate::session::{Session, SessionMeta, resolve_thread_id};

/// One inbound request to route.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    /// The current user message, unmasked.
    pub prompt: String,

    /// Prior conversation turns, oldest first.
    pub history: Vec<Turn>,

    /// Caller-supplied session identifiers.
    pub session: SessionMeta,
}

impl RouteRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_session(mut self, session: SessionMeta) -> Self {
        self.session = session;
        self
    }
}

/// The result of routing: always present, always dispatchable.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// The validated decision (fallback when anything failed).
    pub decision: RoutingDecision,

    /// The prompt to hand to the chosen handler, with real values restored
    /// and the task context injected.
    pub handler_prompt: String,

    /// The resolved session.
    pub session: Session,

    /// Per-request observability metadata.
    pub trace: RouteTrace,
}

/// What happened while routing one request.
#[derive(Debug, Clone)]
pub struct RouteTrace {
    /// Distinct PII values masked in the classifier input.
    pub masked_values: usize,

    /// Wall time spent in classification, including retries.
    pub classifier_ms: u64,

    /// Why the fallback decision was used, when it was.
    pub fallback_reason: Option<String>,
}

/// The privacy-preserving intent router.
pub struct IntentRouter {
    classifier: Arc<dyn Classifier>,
    assembler: ContextAssembler,
    call_timeout: Duration,
    retry: RetryPolicy,
}

impl IntentRouter {
    pub fn new(classifier: Arc<dyn Classifier>, config: &AppConfig) -> Self {
        Self {
            classifier,
            assembler: ContextAssembler::new(&config.masking, config.router.history_window),
            call_timeout: Duration::from_secs(config.classifier.timeout_secs),
            retry: RetryPolicy {
                max_attempts: config.classifier.max_attempts,
                ..RetryPolicy::default()
            },
        }
    }

    /// Override the per-call classifier timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Route one request. Infallible: classification or parsing failures
    /// produce the fallback decision, never an error.
    pub async fn route(&self, request: RouteRequest) -> RouteOutcome {
        let session = Session::new(resolve_thread_id(&request.session));
        let masked = self
            .assembler
            .build_classifier_input(&request.history, &request.prompt);

        let started = Instant::now();
        let (decision, fallback_reason) = match self.classify(&masked.text).await {
            Ok(decision) => (decision, None),
            Err(reason) => {
                warn!(
                    thread_id = %session.thread_id,
                    %reason,
                    "Classification failed, routing to the default handler"
                );
                (RoutingDecision::fallback(), Some(reason))
            }
        };
        let classifier_ms = started.elapsed().as_millis() as u64;

        info!(
            thread_id = %session.thread_id,
            handler = %decision.handler,
            reasoning = ?decision.reasoning,
            fallback = fallback_reason.is_some(),
            classifier_ms,
            "Routed request"
        );

        let handler_prompt = inject_context(
            &request.prompt,
            decision.task_context.as_deref(),
            &masked.mapping,
        );

        // The mapping dies with this request; nothing downstream sees it.
        RouteOutcome {
            decision,
            handler_prompt,
            session,
            trace: RouteTrace {
                masked_values: masked.mapping.len(),
                classifier_ms,
                fallback_reason,
            },
        }
    }

    /// Classify the masked block and parse the result into a validated
    /// decision. Errors are stringified: the caller only falls back.
    async fn classify(&self, masked_input: &str) -> Result<RoutingDecision, String> {
        let raw = with_retry(self.classifier.name(), &self.retry, || {
            with_timeout(
                self.call_timeout,
                self.classifier.classify(masked_input),
                |elapsed| {
                    ClassifierError::Timeout(format!(
                        "no response within {}ms",
                        elapsed.as_millis()
                    ))
                },
            )
        })
        .await
        .map_err(|e| format!("classifier: {e}"))?;

        parse_decision(&raw).map_err(|e| format!("decision: {e}"))
    }
}
