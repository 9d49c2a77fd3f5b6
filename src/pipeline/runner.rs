//! Pipeline runner: drives one spec against the transport collaborator.
//!
//! [`PipelineRunner`] owns a validated [`PipelineSpec`] and turns inputs
//! into output trees: encode the request, hand it to the injected
//! [`Transport`], and rebuild the response into an [`OutputNode`] tree.
//! Three drivers cover the service's calling conventions:
//!
//! - [`run`](PipelineRunner::run) — one synchronous round trip
//! - [`run_job`](PipelineRunner::run_job) — submit, then poll a
//!   long-running job until it completes or the poll budget runs out
//! - [`run_each`](PipelineRunner::run_each) — a batch of inputs, each
//!   isolated so one failure never aborts the rest
//!
//! The runner never retries a transport failure; retry policy lives in
//! the transport implementation.

use std::thread;
use std::time::{Duration, Instant};

use crate::errors::{Error, Result};
use crate::input::InputPayload;
use crate::output::{build_tree, OutputNode};
use crate::pipeline::spec::PipelineSpec;
use crate::request;
use crate::transport::{JobStatus, Transport};

/// Default wait between job polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default poll budget; at the default interval this is ten minutes.
const DEFAULT_MAX_POLLS: usize = 600;

/// Executes a pipeline spec over a transport.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    spec: PipelineSpec,
    poll_interval: Duration,
    max_polls: usize,
}

impl PipelineRunner {
    /// Create a runner with default polling settings.
    pub fn new(spec: PipelineSpec) -> Self {
        Self {
            spec,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Set the wait between job polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many polls to attempt before giving up on a job.
    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// The spec this runner executes.
    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    /// One synchronous round trip: encode, send, rebuild.
    pub fn run(&self, payload: &InputPayload, transport: &dyn Transport) -> Result<OutputNode> {
        let request = request::encode(payload, &self.spec)?;
        tracing::debug!(steps = self.spec.len(), "sending pipeline request");

        let start = Instant::now();
        let response = transport.send(&request)?;
        tracing::debug!(elapsed = %format_elapsed(start.elapsed()), "response received");

        build_tree(&self.spec, response)
    }

    /// Submit a long-running job and poll until it finishes.
    ///
    /// Exhausting the poll budget is a transport failure: the job may
    /// well still complete server-side, but this caller has given up on
    /// it.
    pub fn run_job(&self, payload: &InputPayload, transport: &dyn Transport) -> Result<OutputNode> {
        let request = request::encode(payload, &self.spec)?;

        tracing::debug!("uploading input");
        let handle = transport.submit(&request)?;
        tracing::debug!(task_id = %handle.task_id, "upload complete");

        let start = Instant::now();
        for _ in 0..self.max_polls {
            match transport.poll(&handle)? {
                JobStatus::Completed(response) => {
                    tracing::debug!(
                        task_id = %handle.task_id,
                        elapsed = %format_elapsed(start.elapsed()),
                        "processing complete"
                    );
                    return build_tree(&self.spec, response);
                }
                JobStatus::Failed(reason) => {
                    return Err(Error::transport(format!(
                        "job {} failed: {reason}",
                        handle.task_id
                    )));
                }
                JobStatus::Running => {
                    tracing::debug!(
                        task_id = %handle.task_id,
                        elapsed = %format_elapsed(start.elapsed()),
                        "still processing"
                    );
                    thread::sleep(self.poll_interval);
                }
            }
        }

        Err(Error::transport(format!(
            "job {} did not complete within {} polls",
            handle.task_id, self.max_polls
        )))
    }

    /// Run a batch of inputs sequentially, isolating per-input failures.
    ///
    /// Returns one `Result` per input, in input order. Progress and a
    /// final summary are logged at debug level.
    pub fn run_each(
        &self,
        payloads: &[InputPayload],
        transport: &dyn Transport,
    ) -> Vec<Result<OutputNode>> {
        tracing::debug!(inputs = payloads.len(), "starting batch");

        let mut successful = 0usize;
        let mut failed = 0usize;
        let batch_start = Instant::now();

        let results: Vec<Result<OutputNode>> = payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| {
                let start = Instant::now();
                let result = self.run(payload, transport);
                match &result {
                    Ok(_) => successful += 1,
                    Err(err) => {
                        failed += 1;
                        tracing::error!(input = i, "input failed: {err}");
                    }
                }
                tracing::debug!(
                    input = i,
                    elapsed = %format_elapsed(start.elapsed()),
                    successful,
                    failed,
                    "input processed"
                );
                result
            })
            .collect();

        tracing::debug!(
            inputs = payloads.len(),
            successful,
            failed,
            elapsed = %format_elapsed(batch_start.elapsed()),
            "batch complete"
        );
        results
    }
}

/// Format a duration as `"1m 23s 456ms"`, dropping the minutes part when
/// under a minute.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    if secs > 59 {
        format!("{}m {}s {millis}ms", secs / 60, secs % 60)
    } else {
        format!("{secs}s {millis}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;
    use crate::request::EncodedRequest;
    use crate::skills;
    use crate::transport::{JobHandle, RawResponse, ResponseBlock};
    use std::sync::Mutex;

    /// Scripted in-memory transport: answers `send` from a queue and
    /// walks `poll` through a fixed status sequence.
    struct ScriptedTransport {
        responses: Mutex<Vec<Result<RawResponse>>>,
        statuses: Mutex<Vec<JobStatus>>,
        polls: Mutex<usize>,
    }

    impl ScriptedTransport {
        fn sending(responses: Vec<Result<RawResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                statuses: Mutex::new(Vec::new()),
                polls: Mutex::new(0),
            }
        }

        fn polling(statuses: Vec<JobStatus>) -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                statuses: Mutex::new(statuses),
                polls: Mutex::new(0),
            }
        }

        fn poll_count(&self) -> usize {
            *self.polls.lock().unwrap()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, _request: &EncodedRequest) -> Result<RawResponse> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(Error::transport("no scripted response left"));
            }
            responses.remove(0)
        }

        fn submit(&self, _request: &EncodedRequest) -> Result<JobHandle> {
            Ok(JobHandle::new("task-1"))
        }

        fn poll(&self, _handle: &JobHandle) -> Result<JobStatus> {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() {
                Ok(JobStatus::Running)
            } else {
                Ok(statuses.remove(0))
            }
        }
    }

    fn keyword_response() -> RawResponse {
        RawResponse::new(vec![
            ResponseBlock::root("b0", "analyze this text.").with_label(Label::new("keyword"))
        ])
    }

    fn runner() -> PipelineRunner {
        let spec = PipelineSpec::builder().skill(skills::keywords()).build().unwrap();
        PipelineRunner::new(spec)
            .with_poll_interval(Duration::ZERO)
            .with_max_polls(5)
    }

    // ─── run ────────────────────────────────────────────────────────────

    #[test]
    fn test_run_builds_tree() {
        let transport = ScriptedTransport::sending(vec![Ok(keyword_response())]);
        let tree = runner().run(&InputPayload::text("analyze this text."), &transport).unwrap();
        assert_eq!(tree.labels("keyword").unwrap().len(), 1);
    }

    #[test]
    fn test_run_surfaces_transport_error_unchanged() {
        let transport =
            ScriptedTransport::sending(vec![Err(Error::transport("503 service unavailable"))]);
        let err = runner().run(&InputPayload::text("x"), &transport).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("503"));
    }

    // ─── run_job ────────────────────────────────────────────────────────

    #[test]
    fn test_run_job_polls_until_complete() {
        let transport = ScriptedTransport::polling(vec![
            JobStatus::Running,
            JobStatus::Running,
            JobStatus::Completed(keyword_response()),
        ]);
        let tree = runner().run_job(&InputPayload::text("x"), &transport).unwrap();
        assert_eq!(transport.poll_count(), 3);
        assert_eq!(tree.labels("keyword").unwrap().len(), 1);
    }

    #[test]
    fn test_run_job_failed_status() {
        let transport =
            ScriptedTransport::polling(vec![JobStatus::Failed("input too large".into())]);
        let err = runner().run_job(&InputPayload::text("x"), &transport).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("input too large"));
    }

    #[test]
    fn test_run_job_poll_budget_exhausted() {
        let transport = ScriptedTransport::polling(vec![]); // always Running
        let err = runner().run_job(&InputPayload::text("x"), &transport).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("5 polls"));
        assert_eq!(transport.poll_count(), 5);
    }

    // ─── run_each ───────────────────────────────────────────────────────

    #[test]
    fn test_run_each_isolates_failures() {
        let transport = ScriptedTransport::sending(vec![
            Ok(keyword_response()),
            Err(Error::transport("boom")),
            Ok(keyword_response()),
        ]);
        let inputs = vec![
            InputPayload::text("one"),
            InputPayload::text("two"),
            InputPayload::text("three"),
        ];

        let results = runner().run_each(&inputs, &transport);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    // ─── formatting ─────────────────────────────────────────────────────

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(450)), "0s 450ms");
        assert_eq!(format_elapsed(Duration::from_millis(61_250)), "1m 1s 250ms");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "59s 0ms");
    }
}
