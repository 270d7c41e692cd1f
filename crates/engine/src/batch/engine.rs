//! Orchestration engine.
//!
//! Gating runs first, single-threaded and in input order. Dispatched calls
//! then share a FIFO semaphore of `max_concurrency` permits and each writes
//! only to its own record, so no locking is needed beyond the slots.

use chrono::Utc;
use futures::future::join_all;
use policy::{BatchPolicy, Decision};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{AggregateReport, CallError, ErrorKind, ToolCallRecord};
use crate::tools::{ToolArguments, ToolCallRequest, ToolError, ToolRegistry, contain_panics};
use crate::{Error, Result};

/// A gated record waiting for a slot.
struct Job<'a, T> {
    record: &'a mut ToolCallRecord,
    /// Resolved at gating time; `None` for deferred calls.
    tool: Option<T>,
    arguments: Value,
}

/// Runs batches of tool calls against a registry.
///
/// Holds no state across batches.
#[derive(Debug)]
pub struct Orchestrator<R> {
    registry: R,
}

impl<R: ToolRegistry> Orchestrator<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Run every request to a terminal state and report in input order.
    ///
    /// Per-call failures land in the report. Only an invalid policy fails
    /// the call itself.
    #[tracing::instrument(
        name = "batch",
        skip_all,
        fields(size = requests.len(), strict = policy.strict, max_concurrency = policy.max_concurrency)
    )]
    pub async fn run_batch(
        &self,
        requests: Vec<ToolCallRequest>,
        policy: &BatchPolicy,
    ) -> Result<AggregateReport> {
        policy.validate()?;
        let started_at = Utc::now();

        let mut records: Vec<ToolCallRecord> = requests
            .into_iter()
            .map(|mut request| {
                request.ensure_id();
                ToolCallRecord::new(request)
            })
            .collect();

        let mut jobs = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            let tool = self.registry.lookup(&record.request.name);

            if let Decision::Reject { reason } = policy.gate(tool.is_some()) {
                debug!(id = %record.request.id, name = %record.request.name, "rejected unregistered tool");
                record.reject(CallError::with_detail(
                    ErrorKind::Rejected,
                    format!("{reason}: {}", record.request.name),
                ))?;
                continue;
            }

            match ToolArguments::decode(&record.request.arguments) {
                Ok(arguments) => jobs.push(Job {
                    record,
                    tool,
                    arguments: arguments.into_inner(),
                }),
                Err(error) => {
                    warn!(id = %record.request.id, %error, "could not decode arguments");
                    record.fail(error.into())?;
                }
            }
        }

        let slots = Semaphore::new(policy.max_concurrency.min(Semaphore::MAX_PERMITS));
        debug!(dispatched = jobs.len(), "dispatching");

        join_all(jobs.into_iter().map(|job| self.dispatch(&slots, job)))
            .await
            .into_iter()
            .collect::<Result<()>>()?;

        let report = AggregateReport::new(records, started_at);
        let summary = report.summary();
        info!(
            total = summary.total,
            ok = summary.ok,
            error = summary.error,
            rejected = summary.rejected,
            "batch finished"
        );
        Ok(report)
    }

    async fn dispatch(&self, slots: &Semaphore, job: Job<'_, R::Tool>) -> Result<()> {
        let Job {
            record,
            tool,
            arguments,
        } = job;

        let _permit = slots
            .acquire()
            .await
            .map_err(|_| Error::InvalidState("concurrency slots closed".into()))?;
        record.start()?;

        // Deferred calls get one more chance to resolve.
        let tool = tool.or_else(|| self.registry.lookup(&record.request.name));
        let outcome = match tool {
            Some(tool) => {
                contain_panics(async move { self.registry.execute(&tool, arguments).await }).await
            }
            None => Err(ToolError::NotFound(record.request.name.clone())),
        };

        match outcome {
            Ok(result) => record.complete(result),
            Err(error) => {
                warn!(id = %record.request.id, name = %record.request.name, %error, "tool call failed");
                record.fail(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{StateKind, Summary};
    use crate::tools::{EmptyRegistry, ToolSet};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Registry that records every executed call.
    #[derive(Default)]
    struct Recorder {
        tools: ToolSet,
        executed: parking_lot::Mutex<Vec<Value>>,
    }

    impl ToolRegistry for Recorder {
        type Tool = <ToolSet as ToolRegistry>::Tool;

        fn lookup(&self, name: &str) -> Option<Self::Tool> {
            self.tools.lookup(name)
        }

        async fn execute(&self, tool: &Self::Tool, arguments: Value) -> std::result::Result<Value, ToolError> {
            self.executed.lock().push(arguments.clone());
            self.tools.execute(tool, arguments).await
        }
    }

    async fn buggy(_: Value) -> std::result::Result<Value, ToolError> {
        panic!("tool bug")
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest::new(id, name, arguments)
    }

    fn math() -> ToolSet {
        ToolSet::new()
            .with("add", |args: Value| async move {
                let a = args["a"].as_i64().unwrap_or_default();
                let b = args["b"].as_i64().unwrap_or_default();
                tokio::task::yield_now().await;
                Ok(json!(a + b))
            })
            .with("mul", |args: Value| async move {
                let x = args["x"].as_i64().unwrap_or_default();
                let y = args["y"].as_i64().unwrap_or_default();
                Ok(json!(x * y))
            })
            .with("fail", |_| async { Err(ToolError::execution("kaboom")) })
    }

    #[tokio::test]
    async fn strict_rejects_unregistered_without_executing() {
        let registry = Recorder {
            tools: math(),
            ..Default::default()
        };
        let engine = Orchestrator::new(registry);

        let report = engine
            .run_batch(
                vec![
                    call("1", "add", json!({"a": 1, "b": 2})),
                    call("2", "nope", json!({"marker": true})),
                ],
                &BatchPolicy::strict(4),
            )
            .await
            .unwrap();

        let ok = report.get("1").unwrap();
        assert_eq!(ok.state().kind(), StateKind::Ok);
        assert_eq!(ok.result(), Some(&json!(3)));
        assert!(ok.error().is_none());

        let rejected = report.get("2").unwrap();
        assert_eq!(rejected.state().kind(), StateKind::Rejected);
        assert_eq!(rejected.error().unwrap().kind, ErrorKind::Rejected);

        let executed = engine.registry().executed.lock();
        assert_eq!(executed.len(), 1);
        assert!(executed.iter().all(|args| args.get("marker").is_none()));
    }

    #[tokio::test]
    async fn permissive_dispatches_unregistered_and_reports_not_found() {
        let engine = Orchestrator::new(math());
        let report = engine
            .run_batch(
                vec![
                    call("1", "mul", json!({"x": 2, "y": 3})),
                    call("2", "nonexistent", json!({})),
                ],
                &BatchPolicy::permissive(4),
            )
            .await
            .unwrap();

        assert_eq!(report.get("1").unwrap().result(), Some(&json!(6)));

        let missing = report.get("2").unwrap();
        assert_eq!(missing.state().kind(), StateKind::Error);
        assert_eq!(missing.error().unwrap().kind, ErrorKind::ToolNotFound);
    }

    #[tokio::test]
    async fn permissive_resolves_tools_registered_after_gating() {
        let tools = Arc::new(ToolSet::new());
        let late = Arc::clone(&tools);
        tools.register("register_late", move |_| {
            let late = Arc::clone(&late);
            async move {
                late.register("late", |_| async { Ok(json!("found")) });
                Ok(Value::Null)
            }
        });

        let engine = Orchestrator::new(tools);
        let report = engine
            .run_batch(
                vec![
                    call("1", "register_late", json!({})),
                    call("2", "late", json!({})),
                ],
                &BatchPolicy::permissive(1),
            )
            .await
            .unwrap();

        assert_eq!(report.get("2").unwrap().result(), Some(&json!("found")));
    }

    #[tokio::test]
    async fn results_keep_input_order() {
        let tools = ToolSet::new().with("sleep", |args: Value| async move {
            let ms = args["ms"].as_u64().unwrap_or_default();
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(json!(ms))
        });
        let engine = Orchestrator::new(tools);
        let requests: Vec<_> = [40u64, 5, 25, 1, 10]
            .iter()
            .enumerate()
            .map(|(i, ms)| call(&i.to_string(), "sleep", json!({ "ms": ms })))
            .collect();
        let ids: Vec<_> = requests.iter().map(|r| r.id.clone()).collect();

        let report = engine
            .run_batch(requests, &BatchPolicy::permissive(5))
            .await
            .unwrap();

        let got: Vec<_> = report.results().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(got, ids);
        assert_eq!(report.summary().total, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_bound_runs_in_waves() {
        let tools = ToolSet::new().with("sleep", |_| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(json!("slept 300"))
        });
        let engine = Orchestrator::new(tools);
        let requests = (0..4)
            .map(|i| call(&i.to_string(), "sleep", json!({"ms": 300})))
            .collect();

        let started = Instant::now();
        let report = engine
            .run_batch(requests, &BatchPolicy::permissive(2))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed > Duration::from_millis(300), "took {elapsed:?}");
        assert!(elapsed < Duration::from_millis(900), "took {elapsed:?}");
        assert_eq!(report.summary().total, 4);
        assert!(report.is_all_ok());
    }

    #[tokio::test]
    async fn never_exceeds_max_concurrency() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));

        let tools = ToolSet::new().with("work", move |_| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(Value::Null)
            }
        });

        let engine = Orchestrator::new(tools);
        let requests = (0..12).map(|i| call(&i.to_string(), "work", json!({}))).collect();
        let report = engine
            .run_batch(requests, &BatchPolicy::strict(3))
            .await
            .unwrap();

        assert!(report.is_all_ok());
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let engine = Orchestrator::new(math());
        let report = engine
            .run_batch(
                vec![
                    call("a", "fail", json!({})),
                    call("b", "add", json!({"a": 2, "b": 2})),
                    call("c", "fail", json!({})),
                ],
                &BatchPolicy::strict(1),
            )
            .await
            .unwrap();

        let failed = report.get("a").unwrap().error().unwrap();
        assert_eq!(failed.kind, ErrorKind::ExecutionError);
        assert_eq!(failed.detail.as_deref(), Some("kaboom"));
        assert_eq!(report.get("b").unwrap().result(), Some(&json!(4)));
        assert_eq!(
            report.summary(),
            Summary {
                total: 3,
                ok: 1,
                error: 2,
                rejected: 0
            }
        );
    }

    #[tokio::test]
    async fn panicking_tool_fails_only_its_own_call() {
        let tools = math().with("buggy", buggy);
        let engine = Orchestrator::new(tools);
        let report = engine
            .run_batch(
                vec![
                    call("1", "add", json!({"a": 1, "b": 1})),
                    call("2", "buggy", json!({})),
                    call("3", "mul", json!({"x": 3, "y": 3})),
                ],
                &BatchPolicy::strict(2),
            )
            .await
            .unwrap();

        assert_eq!(report.get("1").unwrap().result(), Some(&json!(2)));
        assert_eq!(report.get("3").unwrap().result(), Some(&json!(9)));

        let buggy = report.get("2").unwrap();
        assert_eq!(buggy.state().kind(), StateKind::Error);
        let error = buggy.error().unwrap();
        assert_eq!(error.kind, ErrorKind::ExecutionError);
        assert!(error.detail.as_deref().unwrap().contains("panicked"));
        assert_eq!(report.summary().error, 1);
    }

    #[tokio::test]
    async fn undecodable_arguments_fail_before_dispatch() {
        let registry = Recorder {
            tools: math(),
            ..Default::default()
        };
        let engine = Orchestrator::new(registry);
        let report = engine
            .run_batch(
                vec![
                    call("1", "add", json!("{\"a\": 1, \"b\": 4}")),
                    call("2", "add", json!("{broken")),
                ],
                &BatchPolicy::strict(2),
            )
            .await
            .unwrap();

        assert_eq!(report.get("1").unwrap().result(), Some(&json!(5)));
        let bad = report.get("2").unwrap();
        assert_eq!(bad.state().kind(), StateKind::Error);
        assert_eq!(bad.error().unwrap().kind, ErrorKind::ArgumentDecodeError);
        assert_eq!(engine.registry().executed.lock().len(), 1);
    }

    #[tokio::test]
    async fn strict_gate_precedes_argument_decoding() {
        let engine = Orchestrator::new(EmptyRegistry);
        let report = engine
            .run_batch(vec![call("1", "ghost", json!("{broken"))], &BatchPolicy::strict(1))
            .await
            .unwrap();
        assert_eq!(report.results()[0].error().unwrap().kind, ErrorKind::Rejected);
    }

    #[tokio::test]
    async fn missing_ids_are_synthesized() {
        let engine = Orchestrator::new(math());
        let report = engine
            .run_batch(
                vec![
                    call("", "add", json!({})),
                    call("", "add", json!({})),
                ],
                &BatchPolicy::default(),
            )
            .await
            .unwrap();

        let ids: Vec<_> = report.results().iter().map(|r| r.id()).collect();
        assert!(ids.iter().all(|id| id.starts_with("call_")));
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn invalid_policy_is_a_hard_error() {
        let engine = Orchestrator::new(math());
        let result = engine
            .run_batch(vec![call("1", "add", json!({}))], &BatchPolicy::strict(0))
            .await;
        assert!(matches!(result, Err(Error::Policy(_))));
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = Orchestrator::new(EmptyRegistry);
        let report = engine
            .run_batch(Vec::new(), &BatchPolicy::default())
            .await
            .unwrap();
        assert_eq!(report.summary(), Summary::default());
    }

    #[tokio::test]
    async fn all_records_terminal_and_counted() {
        let engine = Orchestrator::new(math());
        let requests = vec![
            call("1", "add", json!({})),
            call("2", "ghost", json!({})),
            call("3", "fail", json!({})),
            call("4", "mul", json!("{oops")),
        ];

        for policy in [BatchPolicy::strict(2), BatchPolicy::permissive(2)] {
            let report = engine.run_batch(requests.clone(), &policy).await.unwrap();
            assert_eq!(report.results().len(), requests.len());
            assert!(report.results().iter().all(ToolCallRecord::is_terminal));

            let s = report.summary();
            assert_eq!(s.total, requests.len());
            assert_eq!(s.ok + s.error + s.rejected, s.total);
        }
    }
}
