//! Back end of the CodeLab student code editor.
//!
//! The editor hands this crate a language and a text buffer. Markup languages
//! are rendered into local previews, JavaScript and a small Python subset are
//! evaluated in an embedded engine, and everything with a backend identifier
//! is sent to a remote code-execution service. Several service endpoints can be
//! configured; they are tried one after another until one accepts the
//! submission, and the result is polled until it settles or the attempt
//! budget runs out. When no endpoint is reachable the user still gets a crude
//! local syntax check. Buffers can also be packaged into a zip download.
//!
//! - [`language`]: language tags, backend ids, templates
//! - [`protocol`]: wire types and base64 result decoding
//! - [`transport`]: HTTP access to an endpoint, behind a trait
//! - [`dispatcher`]: endpoint fallback and polling
//! - [`diagnostics`]: advisory syntax heuristics
//! - [`scripting`]: local JavaScript and simple Python evaluation
//! - [`workbench`]: run / download / template actions
//! - [`config`]: YAML configuration

pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod endpoint;
pub mod errors;
pub mod language;
pub mod packaging;
pub mod preview;
pub mod protocol;
pub mod report;
pub mod scripting;
pub mod transport;
pub mod workbench;

pub use config::{CodeLabConfig, ConfigLoader};
pub use dispatcher::{ExecutionDispatcher, PollPolicy};
pub use endpoint::EndpointDescriptor;
pub use errors::CodeLabError;
pub use language::{Language, LanguageTable};
pub use protocol::{ExecutionRequest, ExecutionResult, ExecutionStatus};
pub use report::{DispatchReport, OutputSink, Outcome, Report};
pub use scripting::ScriptEngine;
pub use transport::{ExecutionTransport, HttpTransport};
pub use workbench::{RunReport, RunStatus, Workbench};

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod test_http_dispatch;
