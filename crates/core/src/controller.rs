//! Request lifecycle for content generation.
//!
//! [`GenerationController`] owns the current [`UiState`], turns user selections
//! into a prompt, hands the prompt to a [`GenerationClient`] on a background
//! task and publishes the outcome to every subscriber.
//!
//! Each call to [`GenerationController::request_generation`] is tagged with a
//! monotonically increasing [`RequestId`]. Only the newest request may move the
//! state out of `Loading`; results from older requests that arrive late are
//! dropped.

use crate::client::GenerationClient;
use crate::error::{AppError, GenerationFailure, Result};
use crate::prompt::{build_prompt, Format, GenerationRequest, Length, Tone};
use crate::state::UiState;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Identifies one call to [`GenerationController::request_generation`].
pub type RequestId = u64;

/// Error message used when the model answers without any text.
pub const EMPTY_OUTPUT_MESSAGE: &str = "The model returned no text";

/// What to do when the client succeeds but returns no text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyOutputPolicy {
    /// Leave the state at `Loading`.
    Stall,
    /// Resolve to `Error` with [`EMPTY_OUTPUT_MESSAGE`].
    #[default]
    Error,
    /// Resolve to `Success` with empty text.
    EmptySuccess,
}

impl FromStr for EmptyOutputPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stall" => Ok(Self::Stall),
            "error" => Ok(Self::Error),
            "success" | "empty-success" | "empty_success" => Ok(Self::EmptySuccess),
            _ => Err(AppError::invalid_option("empty output policy", s)),
        }
    }
}

/// Tuning knobs for [`GenerationController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Upper bound for a single client call. `None` waits forever.
    pub timeout: Option<Duration>,
    pub empty_output: EmptyOutputPolicy,
}

/// Handle to a request that has been dispatched.
///
/// Dropping it does not cancel anything; the request keeps running and its
/// outcome still reaches subscribers.
#[derive(Debug)]
pub struct RequestTicket {
    id: RequestId,
    task: JoinHandle<()>,
}

impl RequestTicket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Waits until the background task has finished handling the response.
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            warn!(request_id = self.id, "generation task ended abnormally: {}", e);
        }
    }
}

/// Drives the `Initial -> Loading -> Success | Error` state machine.
pub struct GenerationController<C: ?Sized = dyn GenerationClient> {
    client: Arc<C>,
    options: ControllerOptions,
    runtime: Handle,
    state: Arc<watch::Sender<UiState>>,
    latest: Arc<AtomicU64>,
}

impl<C> GenerationController<C>
where
    C: GenerationClient + ?Sized + 'static,
{
    /// Creates a controller that runs requests on `runtime`.
    pub fn new(client: Arc<C>, options: ControllerOptions, runtime: Handle) -> Self {
        let (state, _) = watch::channel(UiState::Initial);
        Self {
            client,
            options,
            runtime,
            state: Arc::new(state),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a controller bound to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Runtime`] when called outside a tokio runtime.
    pub fn with_current_runtime(client: Arc<C>, options: ControllerOptions) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| AppError::Runtime(e.to_string()))?;
        Ok(Self::new(client, options, runtime))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Returns a read-only view that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// Id of the newest request, or 0 if none has been issued.
    pub fn latest_request(&self) -> RequestId {
        self.latest.load(Ordering::SeqCst)
    }

    /// Convenience wrapper around [`request_generation`](Self::request_generation).
    pub fn request(&self, request: &GenerationRequest) -> RequestTicket {
        self.request_generation(&request.topic, request.tone, request.format, request.length)
    }

    /// Starts a generation request and returns without waiting for it.
    ///
    /// The state is `Loading` by the time this returns. The outcome is only
    /// observable through [`state`](Self::state) and [`subscribe`](Self::subscribe);
    /// failures are never returned to the caller.
    pub fn request_generation(
        &self,
        topic: &str,
        tone: Tone,
        format: Format,
        length: Length,
    ) -> RequestTicket {
        // The id bump and the Loading write happen under the channel lock so a
        // resolving task can never observe one without the other.
        let mut id = 0;
        self.state.send_modify(|state| {
            id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = UiState::Loading;
        });

        let prompt = build_prompt(topic, tone, format, length);
        info!(request_id = id, %tone, %format, %length, "generation requested");
        debug!(request_id = id, prompt = %prompt, "prompt built");

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest);
        let options = self.options;

        let task = self.runtime.spawn(async move {
            let outcome = call_client(&*client, &prompt, options.timeout).await;
            match resolve(outcome, options.empty_output) {
                Some(next) => {
                    let kind = match &next {
                        UiState::Success { .. } => "success",
                        _ => "error",
                    };
                    if publish(&state, &latest, id, next) {
                        info!(request_id = id, outcome = kind, "generation resolved");
                    } else {
                        debug!(request_id = id, outcome = kind, "dropping stale generation result");
                    }
                }
                None => {
                    warn!(request_id = id, "model returned no text, leaving state at loading");
                }
            }
        });

        RequestTicket { id, task }
    }
}

async fn call_client<C>(
    client: &C,
    prompt: &str,
    timeout: Option<Duration>,
) -> std::result::Result<String, GenerationFailure>
where
    C: GenerationClient + ?Sized,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.generate(prompt))
            .await
            .unwrap_or_else(|_| {
                Err(GenerationFailure::new(format!(
                    "request timed out after {limit:?}"
                )))
            }),
        None => client.generate(prompt).await,
    }
}

/// Maps a client outcome to the next state. `None` means "stay in Loading".
fn resolve(
    outcome: std::result::Result<String, GenerationFailure>,
    empty_output: EmptyOutputPolicy,
) -> Option<UiState> {
    match outcome {
        Ok(text) if !text.is_empty() => Some(UiState::success(text)),
        Ok(_) => match empty_output {
            EmptyOutputPolicy::Stall => None,
            EmptyOutputPolicy::Error => Some(UiState::error(EMPTY_OUTPUT_MESSAGE)),
            EmptyOutputPolicy::EmptySuccess => Some(UiState::success(String::new())),
        },
        Err(failure) => Some(UiState::error(failure.message)),
    }
}

/// Writes `next` only if `id` is still the newest request.
fn publish(
    state: &watch::Sender<UiState>,
    latest: &AtomicU64,
    id: RequestId,
    next: UiState,
) -> bool {
    state.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != id {
            return false;
        }
        *current = next;
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Reply = std::result::Result<String, GenerationFailure>;

    struct FixedClient(Reply);

    #[async_trait]
    impl GenerationClient for FixedClient {
        async fn generate(&self, _prompt: &str) -> Reply {
            self.0.clone()
        }
    }

    /// Each call waits for the reply sent through the matching gate.
    #[derive(Default)]
    struct GatedClient {
        gates: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl GatedClient {
        fn gate(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }
    }

    #[async_trait]
    impl GenerationClient for GatedClient {
        async fn generate(&self, prompt: &str) -> Reply {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(GenerationFailure::new("gate dropped"))),
                None => Err(GenerationFailure::new("no gate")),
            }
        }
    }

    struct NeverClient;

    #[async_trait]
    impl GenerationClient for NeverClient {
        async fn generate(&self, _prompt: &str) -> Reply {
            std::future::pending().await
        }
    }

    fn controller<C: GenerationClient + 'static>(
        client: C,
        options: ControllerOptions,
    ) -> GenerationController<C> {
        GenerationController::with_current_runtime(Arc::new(client), options).unwrap()
    }

    #[tokio::test]
    async fn starts_in_initial_state() {
        let ctrl = controller(FixedClient(Ok("x".into())), ControllerOptions::default());
        assert_eq!(ctrl.state(), UiState::Initial);
        assert_eq!(ctrl.latest_request(), 0);
    }

    #[tokio::test]
    async fn loading_is_visible_before_the_call_completes() {
        let ctrl = controller(FixedClient(Ok("Hello world".into())), ControllerOptions::default());
        let ticket = ctrl.request_generation("", Tone::Casual, Format::Paragraph, Length::Short);
        assert_eq!(ctrl.state(), UiState::Loading);
        ticket.finished().await;
        assert_eq!(ctrl.state(), UiState::success("Hello world"));
    }

    #[tokio::test]
    async fn success_publishes_output_text() {
        let ctrl = controller(FixedClient(Ok("Hello world".into())), ControllerOptions::default());
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(
            ctrl.state(),
            UiState::Success {
                output_text: "Hello world".into()
            }
        );
    }

    #[tokio::test]
    async fn failure_publishes_error_message() {
        let ctrl = controller(
            FixedClient(Err(GenerationFailure::new("timeout"))),
            ControllerOptions::default(),
        );
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::error("timeout"));
    }

    #[tokio::test]
    async fn failure_without_description_gives_empty_message() {
        let ctrl = controller(
            FixedClient(Err(GenerationFailure::new(""))),
            ControllerOptions::default(),
        );
        ctrl.request_generation("cats", Tone::Funny, Format::Ideas, Length::Long)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::error(""));
    }

    #[tokio::test]
    async fn empty_output_stalls_under_stall_policy() {
        let options = ControllerOptions {
            empty_output: EmptyOutputPolicy::Stall,
            ..Default::default()
        };
        let ctrl = controller(FixedClient(Ok(String::new())), options);
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::Loading);
    }

    #[tokio::test]
    async fn empty_output_is_an_error_by_default() {
        let ctrl = controller(FixedClient(Ok(String::new())), ControllerOptions::default());
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::error(EMPTY_OUTPUT_MESSAGE));
    }

    #[tokio::test]
    async fn empty_output_can_resolve_to_empty_success() {
        let options = ControllerOptions {
            empty_output: EmptyOutputPolicy::EmptySuccess,
            ..Default::default()
        };
        let ctrl = controller(FixedClient(Ok(String::new())), options);
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::success(""));
    }

    #[tokio::test]
    async fn client_receives_rendered_prompt() {
        let client = Arc::new(GatedClient::default());
        let gate = client.gate();
        let ctrl = GenerationController::with_current_runtime(
            Arc::clone(&client),
            ControllerOptions::default(),
        )
        .unwrap();

        let ticket = ctrl.request_generation("tea", Tone::Informative, Format::BlogPost, Length::Long);
        gate.send(Ok("done".into())).unwrap();
        ticket.finished().await;

        let prompts = client.prompts.lock().unwrap().clone();
        assert_eq!(
            prompts,
            vec![build_prompt("tea", Tone::Informative, Format::BlogPost, Length::Long)]
        );
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_request() {
        let client = Arc::new(GatedClient::default());
        let first_gate = client.gate();
        let second_gate = client.gate();
        let ctrl = GenerationController::with_current_runtime(
            Arc::clone(&client),
            ControllerOptions::default(),
        )
        .unwrap();

        let first = ctrl.request_generation("one", Tone::Casual, Format::Paragraph, Length::Short);
        // Let the first task take its gate before the second is issued.
        tokio::task::yield_now().await;
        let second = ctrl.request_generation("two", Tone::Casual, Format::Paragraph, Length::Short);
        assert!(second.id() > first.id());
        assert_eq!(ctrl.latest_request(), second.id());

        first_gate.send(Ok("first".into())).unwrap();
        first.finished().await;
        assert_eq!(ctrl.state(), UiState::Loading);

        second_gate.send(Ok("second".into())).unwrap();
        second.finished().await;
        assert_eq!(ctrl.state(), UiState::success("second"));
    }

    #[tokio::test]
    async fn late_stale_response_after_newer_resolution_is_dropped() {
        let client = Arc::new(GatedClient::default());
        let first_gate = client.gate();
        let second_gate = client.gate();
        let ctrl = GenerationController::with_current_runtime(
            Arc::clone(&client),
            ControllerOptions::default(),
        )
        .unwrap();

        let first = ctrl.request_generation("one", Tone::Casual, Format::Paragraph, Length::Short);
        tokio::task::yield_now().await;
        let second = ctrl.request_generation("two", Tone::Casual, Format::Paragraph, Length::Short);

        second_gate.send(Err(GenerationFailure::new("boom"))).unwrap();
        second.finished().await;
        first_gate.send(Ok("first".into())).unwrap();
        first.finished().await;

        assert_eq!(ctrl.state(), UiState::error("boom"));
    }

    #[tokio::test]
    async fn new_request_from_terminal_state_goes_back_to_loading() {
        let ctrl = controller(FixedClient(Ok("text".into())), ControllerOptions::default());
        ctrl.request_generation("a", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert!(ctrl.state().is_terminal());

        let ticket = ctrl.request_generation("b", Tone::Casual, Format::Paragraph, Length::Short);
        assert_eq!(ctrl.state(), UiState::Loading);
        ticket.finished().await;
        assert_eq!(ctrl.state(), UiState::success("text"));
    }

    #[tokio::test]
    async fn timeout_resolves_to_error() {
        let options = ControllerOptions {
            timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let ctrl = controller(NeverClient, options);
        ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short)
            .finished()
            .await;
        assert_eq!(ctrl.state(), UiState::error("request timed out after 20ms"));
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_result() {
        let ctrl = controller(FixedClient(Ok("Hello".into())), ControllerOptions::default());
        let mut first = ctrl.subscribe();
        let mut second = ctrl.subscribe();
        assert_eq!(*first.borrow_and_update(), UiState::Initial);

        let ticket = ctrl.request_generation("cats", Tone::Casual, Format::Paragraph, Length::Short);
        assert!(first.has_changed().unwrap());
        assert_eq!(*first.borrow_and_update(), UiState::Loading);

        ticket.finished().await;
        first.changed().await.unwrap();
        assert_eq!(*first.borrow_and_update(), UiState::success("Hello"));
        assert_eq!(*second.borrow_and_update(), UiState::success("Hello"));
    }

    #[test]
    fn requires_a_runtime() {
        let result = GenerationController::with_current_runtime(
            Arc::new(FixedClient(Ok("x".into()))),
            ControllerOptions::default(),
        );
        assert!(matches!(result, Err(AppError::Runtime(_))));
    }

    #[test]
    fn parses_empty_output_policy() {
        assert_eq!("stall".parse::<EmptyOutputPolicy>().unwrap(), EmptyOutputPolicy::Stall);
        assert_eq!("Error".parse::<EmptyOutputPolicy>().unwrap(), EmptyOutputPolicy::Error);
        assert_eq!(
            "success".parse::<EmptyOutputPolicy>().unwrap(),
            EmptyOutputPolicy::EmptySuccess
        );
        assert!("ignore".parse::<EmptyOutputPolicy>().is_err());
    }
}
