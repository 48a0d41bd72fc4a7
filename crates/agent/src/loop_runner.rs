//! The research task loop: invoke, interpret, execute local functions,
//! decide whether to continue, emit events.
//!
//! Each run is a spawned task pushing onto a bounded channel. Exactly one
//! request is outstanding at a time and every run ends with a single
//! `Done`. The loop stops when a response carries no custom function calls
//! or when `max_iterations` is reached. `Plan::is_complete` never stops it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};
use tradvisor_config::AppConfig;
use tradvisor_core::error::ProviderError;
use tradvisor_core::function::FunctionRegistry;
use tradvisor_core::message::HistoryMessage;
use tradvisor_core::plan::Plan;
use tradvisor_core::provider::{InputItem, ModelResponse, ResponseRequest, ResponsesProvider};

use crate::functions::default_registry;
use crate::interpreter::ResponseInterpreter;
use crate::prompts::SYSTEM_PROMPT;
use crate::stream_event::AgentEvent;
use crate::toolset::tool_set;

pub const ITERATION_LIMIT_NOTICE: &str = "\n\n(Reached maximum iterations.)";

/// Leads the text delta reporting a failed model invocation.
pub const API_ERROR_PREFIX: &str = "\n\nAPI Error: ";

/// The consumer dropped its receiver.
struct ConsumerGone;

/// Drives research tasks against a model provider.
#[derive(Clone)]
pub struct AgentLoop {
    /// The model provider to use
    provider: Arc<dyn ResponsesProvider>,

    /// Locally executed functions
    functions: Arc<FunctionRegistry>,

    /// The model to use
    model: String,

    /// First input item of every task
    system_prompt: String,

    /// Maximum model invocations per task
    max_iterations: u32,

    /// Event channel capacity
    event_buffer: usize,

    /// Upper bound on a single invocation, raced against the provider call
    invoke_timeout: Option<Duration>,
}

impl AgentLoop {
    /// Create a new agent loop from startup configuration.
    pub fn new(provider: Arc<dyn ResponsesProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            functions: Arc::new(default_registry()),
            model: config.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_iterations: config.max_iterations.max(1),
            event_buffer: config.event_buffer.max(1),
            invoke_timeout: None,
        }
    }

    /// Set the maximum number of model invocations. Values below 1 are
    /// raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Fail an invocation that has not answered within `timeout`.
    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = Some(timeout);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Start a task. Events arrive on the returned receiver in order, the
    /// last one being `Done`. Dropping the receiver stops the task at its
    /// next emit.
    pub fn run_stream(&self, task: &str) -> mpsc::Receiver<AgentEvent> {
        self.run_stream_with_history(task, &[])
    }

    /// Start a task seeded with earlier turns. Only non-blank user and
    /// assistant turns are replayed.
    pub fn run_stream_with_history(
        &self,
        task: &str,
        history: &[HistoryMessage],
    ) -> mpsc::Receiver<AgentEvent> {
        let (tx, rx) = mpsc::channel::<AgentEvent>(self.event_buffer);

        let input = self.initial_input(task, history);
        let this = self.clone();
        let span = info_span!(
            "research_task",
            run_id = %uuid::Uuid::new_v4(),
            model = %self.model,
        );

        tokio::spawn(
            async move {
                if this.drive(input, &tx).await.is_err() {
                    debug!("Consumer went away, abandoning task");
                }
            }
            .instrument(span),
        );

        rx
    }

    fn initial_input(&self, task: &str, history: &[HistoryMessage]) -> Vec<InputItem> {
        let mut input = Vec::with_capacity(history.len() + 2);
        input.push(InputItem::system(self.system_prompt.as_str()));
        input.extend(
            history
                .iter()
                .filter(|m| m.is_replayable())
                .map(|m| InputItem::Message {
                    role: m.role,
                    content: m.content.clone(),
                }),
        );
        input.push(InputItem::user(task));
        input
    }

    async fn drive(
        &self,
        mut input: Vec<InputItem>,
        tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<(), ConsumerGone> {
        let tools = tool_set(&self.functions);
        let interpreter = ResponseInterpreter::new(&self.functions);
        let mut plan: Option<Plan> = None;
        let mut previous_response_id: Option<String> = None;

        info!(max_iterations = self.max_iterations, "Research task started");

        for iteration in 1..=self.max_iterations {
            let request = ResponseRequest {
                model: self.model.clone(),
                tools: tools.clone(),
                input: std::mem::take(&mut input),
                previous_response_id: previous_response_id.clone(),
            };

            debug!(iteration, "Invoking model");
            let response = match self.invoke(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(iteration, error = %e, "Model invocation failed, ending task");
                    emit(tx, AgentEvent::text(format!("{API_ERROR_PREFIX}{e}"))).await?;
                    return finish(tx, iteration, plan).await;
                }
            };

            if let Some(usage) = &response.usage {
                debug!(
                    iteration,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    total_tokens = usage.total_tokens,
                    "Model usage"
                );
            }

            let interpretation = interpreter.interpret(&response.output, &mut plan);
            previous_response_id = Some(response.id);

            let settled = interpretation.is_settled();
            for event in interpretation.events {
                emit(tx, event).await?;
            }

            if settled {
                return finish(tx, iteration, plan).await;
            }

            debug!(
                iteration,
                outputs = interpretation.outputs.len(),
                "Returning function outputs"
            );
            input = interpretation
                .outputs
                .into_iter()
                .map(InputItem::from)
                .collect();
        }

        warn!(max_iterations = self.max_iterations, "Iteration limit reached");
        emit(tx, AgentEvent::text(ITERATION_LIMIT_NOTICE)).await?;
        finish(tx, self.max_iterations, plan).await
    }

    async fn invoke(&self, request: ResponseRequest) -> Result<ModelResponse, ProviderError> {
        let call = self.provider.create_response(request);
        match self.invoke_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ProviderError::Timeout(format!("no response within {limit:?}"))
            })?,
            None => call.await,
        }
    }
}

async fn emit(tx: &mpsc::Sender<AgentEvent>, event: AgentEvent) -> Result<(), ConsumerGone> {
    tx.send(event).await.map_err(|_| ConsumerGone)
}

async fn finish(
    tx: &mpsc::Sender<AgentEvent>,
    iterations: u32,
    plan: Option<Plan>,
) -> Result<(), ConsumerGone> {
    info!(iterations, has_plan = plan.is_some(), "Research task finished");
    emit(tx, AgentEvent::Done { iterations, plan }).await
}
