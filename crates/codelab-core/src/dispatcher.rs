//! Remote execution dispatch with endpoint fallback and bounded polling
//!
//! A request is offered to each configured endpoint in declaration order,
//! one at a time. The first endpoint that accepts the submission owns it:
//! its result, its timeout or its polling failure ends the dispatch. Only a
//! failed submission moves on to the next endpoint. When every endpoint
//! refuses, the report carries local advisory diagnostics instead.

use std::sync::Arc;
use std::time::Duration;

use crate::diagnostics::check_syntax;
use crate::endpoint::EndpointDescriptor;
use crate::errors::CodeLabError;
use crate::protocol::{ExecutionRequest, ExecutionResult, SubmissionBody};
use crate::report::{DispatchReport, Outcome, Report};
use crate::transport::ExecutionTransport;

const EXHAUSTED_SUGGESTIONS: [&str; 4] = [
    "   • For Java: Try online IDEs like repl.it or CodePen",
    "   • For C++: Try online compilers like OnlineGDB",
    "   • For MySQL: Try online SQL editors like SQLiteOnline",
    "   • Or run locally with appropriate compilers/databases",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// What happened on a single endpoint.
#[derive(Debug)]
enum EndpointAttempt {
    Finished(ExecutionResult),
    TimedOut { attempts: u32 },
    PollFailed(CodeLabError),
    SubmitFailed(CodeLabError),
}

pub struct ExecutionDispatcher {
    endpoints: Vec<EndpointDescriptor>,
    transport: Arc<dyn ExecutionTransport>,
    poll: PollPolicy,
}

impl ExecutionDispatcher {
    pub fn new(endpoints: Vec<EndpointDescriptor>, transport: Arc<dyn ExecutionTransport>) -> Self {
        Self {
            endpoints,
            transport,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub async fn dispatch(&self, request: &ExecutionRequest) -> DispatchReport {
        let mut report = Report::new();
        let body = request.to_submission_body();

        for endpoint in &self.endpoints {
            if !endpoint.is_primary() {
                report.push(format!("🔄 Trying alternative endpoint {}...", endpoint.url));
            }

            match self.try_endpoint(endpoint, &body).await {
                EndpointAttempt::SubmitFailed(err) => {
                    log::warn!("Submission to {} failed: {}", endpoint.url, err);
                    report.push(format!("❌ Endpoint {} failed: {}", endpoint.url, err));
                }
                EndpointAttempt::Finished(result) => {
                    log::info!(
                        "Execution on {} finished with status {:?}",
                        endpoint.url,
                        result.status
                    );
                    let outcome = if result.is_success() {
                        Outcome::Succeeded
                    } else {
                        Outcome::ExecutionFailed
                    };
                    report.extend(result.render());
                    return DispatchReport { outcome, report };
                }
                EndpointAttempt::TimedOut { attempts } => {
                    log::warn!(
                        "Submission on {} still pending after {} status checks",
                        endpoint.url,
                        attempts
                    );
                    report.push("⏱️ Execution timeout - please try again.");
                    return DispatchReport {
                        outcome: Outcome::TimedOut,
                        report,
                    };
                }
                EndpointAttempt::PollFailed(err) => {
                    log::warn!("Polling {} failed: {}", endpoint.url, err);
                    report.push(format!("❌ Failed to get results: {}", err));
                    return DispatchReport {
                        outcome: Outcome::ExecutionFailed,
                        report,
                    };
                }
            }
        }

        report.push("❌ All execution endpoints unavailable.");
        report.push("💡 Alternative solutions:");
        report.extend(check_syntax(request.language, &request.source_text).render());
        report.extend(EXHAUSTED_SUGGESTIONS);
        DispatchReport {
            outcome: Outcome::Exhausted,
            report,
        }
    }

    async fn try_endpoint(&self, endpoint: &EndpointDescriptor, body: &SubmissionBody) -> EndpointAttempt {
        let headers = endpoint.request_headers();

        let submitted = match self.transport.submit(endpoint, &headers, body).await {
            Ok(response) => response,
            Err(err) => return EndpointAttempt::SubmitFailed(err),
        };

        let Some(token) = submitted.pending_token() else {
            // Completed synchronously
            return match ExecutionResult::from_response(&submitted) {
                Ok(result) => EndpointAttempt::Finished(result),
                Err(err) => EndpointAttempt::SubmitFailed(err),
            };
        };
        log::debug!("Submission accepted by {} with token {}", endpoint.url, token);

        for attempt in 1..=self.poll.max_attempts {
            let response = match self.transport.poll(endpoint, &headers, token).await {
                Ok(response) => response,
                Err(err) => return EndpointAttempt::PollFailed(err),
            };

            if response.status.is_none() {
                return EndpointAttempt::PollFailed(CodeLabError::Decode(
                    "status missing from submission state".to_string(),
                ));
            }

            if response.is_pending() {
                log::debug!(
                    "Submission {} pending (attempt {}/{})",
                    token,
                    attempt,
                    self.poll.max_attempts
                );
                tokio::time::sleep(self.poll.interval).await;
                continue;
            }

            return match ExecutionResult::from_response(&response) {
                Ok(result) => EndpointAttempt::Finished(result),
                Err(err) => EndpointAttempt::PollFailed(err),
            };
        }

        EndpointAttempt::TimedOut {
            attempts: self.poll.max_attempts,
        }
    }

    /// First endpoint that answers a languages listing, in fallback order.
    pub async fn probe(&self) -> Option<&EndpointDescriptor> {
        for endpoint in &self.endpoints {
            match self.transport.probe(endpoint, &endpoint.request_headers()).await {
                Ok(()) => return Some(endpoint),
                Err(err) => log::debug!("Probe of {} failed: {}", endpoint.url, err),
            }
        }
        None
    }

    /// Connection status line for the output console.
    pub async fn status_line(&self) -> String {
        match self.probe().await {
            Some(endpoint) => format!("🌐 Execution API connected via {}", endpoint.url),
            None => "⚠️ Execution API unavailable - Java, C++, MySQL will use local alternatives when possible.".to_string(),
        }
    }
}
