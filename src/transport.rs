//! The transport seam and the raw response shape.
//!
//! The core never talks to the network itself. An implementation of
//! [`Transport`] is injected by the caller and owns everything wire-level:
//! endpoints, auth, retries, version skew in field names, and the decision
//! of when a request must go through the long-running job path. The core's
//! contract is only the logical shapes defined here.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::label::Label;
use crate::request::EncodedRequest;

/// Opaque reference to a long-running service job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub task_id: String,
}

impl JobHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

/// Poll outcome for a submitted job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Still processing; poll again later.
    Running,
    /// Finished; the response is ready for tree building.
    Completed(RawResponse),
    /// The service gave up on the job.
    Failed(String),
}

/// One text block of a service response.
///
/// `origin_step_id` is the 1-based pipeline step that generated the
/// block's text; 0 marks the block holding the original input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBlock {
    pub block_id: String,
    pub origin_step_id: usize,
    #[serde(default)]
    pub origin_step_name: String,
    pub text: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl ResponseBlock {
    /// Convenience constructor for the block holding the original input.
    pub fn root(block_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            origin_step_id: 0,
            origin_step_name: String::new(),
            text: text.into(),
            labels: Vec::new(),
        }
    }

    /// Convenience constructor for a generated block.
    pub fn generated(
        block_id: impl Into<String>,
        origin_step_id: usize,
        origin_step_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            origin_step_id,
            origin_step_name: origin_step_name.into(),
            text: text.into(),
            labels: Vec::new(),
        }
    }

    /// Append a label, builder style.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }
}

/// The full logical response: an ordered collection of blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawResponse {
    pub blocks: Vec<ResponseBlock>,
}

impl RawResponse {
    pub fn new(blocks: Vec<ResponseBlock>) -> Self {
        Self { blocks }
    }
}

/// The injected wire collaborator.
///
/// # Contract
///
/// - `send` performs one synchronous round trip.
/// - `submit` + `poll` form the long-running job path for large or file
///   inputs; the transport decides which path a request needs.
/// - Failures surface as [`Error::Transport`](crate::errors::Error) and
///   are passed through to the caller unchanged; any retrying happens
///   inside the implementation, never in the core.
pub trait Transport: Send + Sync {
    /// One synchronous request/response round trip.
    fn send(&self, request: &EncodedRequest) -> Result<RawResponse>;

    /// Start a long-running job for this request.
    fn submit(&self, request: &EncodedRequest) -> Result<JobHandle>;

    /// Check on a previously submitted job.
    fn poll(&self, handle: &JobHandle) -> Result<JobStatus>;
}
