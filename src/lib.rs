//! # skillpipe
//!
//! Client core for composing and running text-analysis skill pipelines
//! against a hosted language service.
//!
//! A pipeline is an ordered list of skills. Analyzer skills attach labels
//! to the text they run against; Generator skills produce new text that
//! subsequent skills run against, branching the output into a tree. This
//! crate owns everything up to and back from the wire: describing skills,
//! validating pipelines, encoding requests, and rebuilding responses into
//! a typed output tree. The wire itself lives behind the [`Transport`]
//! trait, injected by the caller.
//!
//! ## Example
//!
//! ```no_run
//! use skillpipe::{skills, InputPayload, PipelineRunner, PipelineSpec};
//! # fn transport() -> Box<dyn skillpipe::Transport> { unimplemented!() }
//!
//! # fn main() -> skillpipe::Result<()> {
//! let spec = PipelineSpec::builder()
//!     .skill(skills::keywords())
//!     .skill(skills::sentiments())
//!     .build()?;
//!
//! let runner = PipelineRunner::new(spec);
//! let output = runner.run(&InputPayload::text("analyze this text."), &*transport())?;
//!
//! for label in output.labels("keywords")? {
//!     println!("{:?}", label.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod input;
pub mod label;
pub mod output;
pub mod parsing;
pub mod pipeline;
pub mod request;
pub mod skills;
pub mod transport;

// Re-export commonly used types
pub use errors::{Error, Result};
pub use input::{InputPayload, Utterance};
pub use label::{Label, LabelValue, Span};
pub use skills::{ParamValue, SkillDescriptor, SkillKind};

// Re-export main functionality
pub use output::{build_tree, OutputNode};
pub use pipeline::errors::{ErrorCode, SpecError};
pub use pipeline::runner::PipelineRunner;
pub use pipeline::spec::{PipelineBuilder, PipelineSpec};
pub use pipeline::validation::{ValidationEngine, ValidationReport};
pub use request::{encode, EncodedRequest};
pub use transport::{JobHandle, JobStatus, RawResponse, ResponseBlock, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
