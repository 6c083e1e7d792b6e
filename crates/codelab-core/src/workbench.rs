//! The editor's actions: run, download, reset to template, connection status.
//!
//! A [`Workbench`] owns no editor state. Each call receives the language and
//! the full buffer text, so two runs never share anything but configuration.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::CodeLabConfig;
use crate::dispatcher::ExecutionDispatcher;
use crate::errors::CodeLabError;
use crate::language::{Language, LanguageTable, RunRoute};
use crate::packaging::{package_project, Bundle, ProjectSource};
use crate::preview::{css_preview, html_preview, PreviewDocument};
use crate::protocol::ExecutionRequest;
use crate::report::{Outcome, Report};
use crate::scripting::{LocalRun, ScriptEngine};
use crate::transport::{ExecutionTransport, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Sent to the remote execution service
    Dispatched(Outcome),
    /// Rendered locally as an HTML document
    Previewed,
    /// Evaluated in the local script engine; `true` when it completed
    Evaluated(bool),
    /// Not run: empty buffer or no way to execute the language
    Rejected,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        match self {
            RunStatus::Dispatched(outcome) => outcome.is_success(),
            RunStatus::Previewed => true,
            RunStatus::Evaluated(succeeded) => *succeeded,
            RunStatus::Rejected => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub status: RunStatus,
    pub report: Report,
    pub preview: Option<PreviewDocument>,
}

pub struct Workbench {
    languages: LanguageTable,
    dispatcher: ExecutionDispatcher,
    scripts: ScriptEngine,
    project_name: String,
}

impl Workbench {
    pub fn new(languages: LanguageTable, dispatcher: ExecutionDispatcher, project_name: impl Into<String>) -> Self {
        Self {
            languages,
            dispatcher,
            scripts: ScriptEngine::new(),
            project_name: project_name.into(),
        }
    }

    /// Workbench talking HTTP to the configured endpoints.
    pub fn from_config(config: &CodeLabConfig) -> Self {
        let transport = HttpTransport::new().with_timeout(config.request_timeout());
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &CodeLabConfig, transport: Arc<dyn ExecutionTransport>) -> Self {
        let dispatcher = ExecutionDispatcher::new(config.endpoints(), transport)
            .with_poll_policy(config.poll_policy());
        Self::new(config.language_table(), dispatcher, config.project.name.clone())
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Starter buffer for a language, used when the editor is cleared.
    pub fn template(&self, language: Language) -> &'static str {
        self.languages.spec(language).template
    }

    pub async fn run(&self, language: Language, code: &str) -> RunReport {
        let mut report = Report::new();

        if code.trim().is_empty() {
            report.push("❌ No code to execute.");
            return RunReport {
                status: RunStatus::Rejected,
                report,
                preview: None,
            };
        }

        report.push(format!("🚀 Running {} code...", language.label()));

        match self.languages.route(language) {
            RunRoute::Remote(language_id) => {
                let request = ExecutionRequest::new(language, language_id, code);
                let dispatched = self.dispatcher.dispatch(&request).await;
                report.extend(dispatched.report.lines().iter().cloned());
                RunReport {
                    status: RunStatus::Dispatched(dispatched.outcome),
                    report,
                    preview: None,
                }
            }
            RunRoute::HtmlPreview => {
                report.push("✅ HTML preview ready.");
                RunReport {
                    status: RunStatus::Previewed,
                    report,
                    preview: Some(html_preview(code)),
                }
            }
            RunRoute::CssPreview => {
                report.push("✅ CSS preview ready.");
                RunReport {
                    status: RunStatus::Previewed,
                    report,
                    preview: Some(css_preview(code)),
                }
            }
            RunRoute::LocalJavaScript => {
                let local = self.scripts.run_javascript(code).await;
                Self::evaluated(report, local)
            }
            RunRoute::LocalPython => {
                let local = self.scripts.run_python(code).await;
                Self::evaluated(report, local)
            }
            RunRoute::Unsupported => {
                log::info!("No execution backend configured for {}", language);
                report.push("❌ Language not supported for execution.");
                RunReport {
                    status: RunStatus::Rejected,
                    report,
                    preview: None,
                }
            }
        }
    }

    fn evaluated(mut report: Report, local: LocalRun) -> RunReport {
        report.extend(local.report.lines().iter().cloned());
        RunReport {
            status: RunStatus::Evaluated(local.succeeded),
            report,
            preview: None,
        }
    }

    pub fn package(&self, language: Language, code: &str, date: NaiveDate) -> Result<Bundle, CodeLabError> {
        package_project(&ProjectSource {
            project_name: &self.project_name,
            language,
            spec: self.languages.spec(language),
            code,
            date,
        })
    }

    pub async fn status_line(&self) -> String {
        self.dispatcher.status_line().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointDescriptor;
    use crate::protocol::{encode_text, SubmissionBody, SubmissionResponse, WireStatus};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Answers every submission inline with status 3 and echoes the source.
    #[derive(Default)]
    struct EchoTransport {
        bodies: Mutex<Vec<SubmissionBody>>,
    }

    #[async_trait]
    impl ExecutionTransport for EchoTransport {
        async fn submit(
            &self,
            _endpoint: &EndpointDescriptor,
            _headers: &BTreeMap<String, String>,
            body: &SubmissionBody,
        ) -> Result<SubmissionResponse, CodeLabError> {
            self.bodies.lock().unwrap().push(body.clone());
            Ok(SubmissionResponse {
                status: Some(WireStatus {
                    id: 3,
                    description: Some("Accepted".to_string()),
                }),
                stdout: Some(encode_text("echo")),
                ..Default::default()
            })
        }

        async fn poll(
            &self,
            endpoint: &EndpointDescriptor,
            _headers: &BTreeMap<String, String>,
            _token: &str,
        ) -> Result<SubmissionResponse, CodeLabError> {
            Err(CodeLabError::transport(&endpoint.url, "not expected"))
        }

        async fn probe(
            &self,
            _endpoint: &EndpointDescriptor,
            _headers: &BTreeMap<String, String>,
        ) -> Result<(), CodeLabError> {
            Ok(())
        }
    }

    fn workbench() -> (Workbench, Arc<EchoTransport>) {
        let transport = Arc::new(EchoTransport::default());
        let workbench = Workbench::with_transport(&CodeLabConfig::default(), transport.clone());
        (workbench, transport)
    }

    #[tokio::test]
    async fn test_empty_buffer_is_rejected() {
        let (workbench, transport) = workbench();
        let run = workbench.run(Language::Java, "   \n").await;
        assert_eq!(run.status, RunStatus::Rejected);
        assert_eq!(run.report.lines(), ["❌ No code to execute.".to_string()]);
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_languages_are_dispatched_with_backend_id() {
        let (workbench, transport) = workbench();
        let run = workbench.run(Language::Cpp, workbench.template(Language::Cpp)).await;

        assert_eq!(run.status, RunStatus::Dispatched(Outcome::Succeeded));
        assert!(run.status.is_success());
        assert_eq!(run.report.lines()[0], "🚀 Running CPP code...");
        assert!(run.report.contains("echo"));
        assert_eq!(transport.bodies.lock().unwrap()[0].language_id, 54);
    }

    #[tokio::test]
    async fn test_markup_languages_are_previewed() {
        let (workbench, transport) = workbench();

        let run = workbench.run(Language::Css, "p { margin: 0; }").await;
        assert_eq!(run.status, RunStatus::Previewed);
        let preview = run.preview.unwrap();
        assert!(preview.html.contains("p { margin: 0; }"));
        assert!(preview.html.contains("<title>CSS Preview</title>"));

        let run = workbench.run(Language::Html, "<h1>x</h1>").await;
        assert_eq!(run.preview.unwrap().html, "<h1>x</h1>");
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_javascript_runs_locally() {
        let (workbench, transport) = workbench();
        let run = workbench
            .run(Language::Javascript, "console.log(\"Hello, World!\");")
            .await;

        assert_eq!(run.status, RunStatus::Evaluated(true));
        assert!(run.status.is_success());
        assert_eq!(
            run.report.lines(),
            [
                "🚀 Running JAVASCRIPT code...".to_string(),
                "✅ JavaScript execution completed:".to_string(),
                "Hello, World!".to_string(),
            ]
        );
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_javascript_error_is_not_a_success() {
        let (workbench, _) = workbench();
        let run = workbench.run(Language::Javascript, "nope(").await;
        assert_eq!(run.status, RunStatus::Evaluated(false));
        assert!(run.report.lines()[1].starts_with("❌ JavaScript Error: "));
    }

    #[tokio::test]
    async fn test_python_template_runs_locally() {
        let (workbench, transport) = workbench();
        let run = workbench
            .run(Language::Python, workbench.template(Language::Python))
            .await;

        assert_eq!(run.status, RunStatus::Evaluated(true));
        assert_eq!(run.report.lines()[0], "🚀 Running PYTHON code...");
        assert_eq!(run.report.lines()[1], "⚠️ Simple Python evaluation:");
        assert_eq!(run.report.lines()[2], "Hello, World!");
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configured_python_backend_is_dispatched() {
        let config = crate::config::ConfigLoader::from_str("languages:\n  python:\n    backend_id: 71\n").unwrap();
        let transport = Arc::new(EchoTransport::default());
        let workbench = Workbench::with_transport(&config, transport.clone());

        let run = workbench.run(Language::Python, "print(1)").await;
        assert_eq!(run.status, RunStatus::Dispatched(Outcome::Succeeded));
        assert_eq!(transport.bodies.lock().unwrap()[0].language_id, 71);
    }

    #[tokio::test]
    async fn test_disabled_language_is_unsupported() {
        let config = crate::config::ConfigLoader::from_str("languages:\n  javascript:\n    disabled: true\n").unwrap();
        let workbench = Workbench::with_transport(&config, Arc::new(EchoTransport::default()));

        let run = workbench.run(Language::Javascript, "console.log(1)").await;
        assert_eq!(run.status, RunStatus::Rejected);
        assert!(run.report.contains("Language not supported for execution."));
    }

    #[test]
    fn test_package_uses_project_name() {
        let (workbench, _) = workbench();
        let workbench = workbench.with_project_name("Final Exam");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bundle = workbench.package(Language::Mysql, "SELECT 1;", date).unwrap();
        assert_eq!(bundle.file_name, "final_exam.zip");
    }
}
