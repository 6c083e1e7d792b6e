//! Local script evaluation for languages that never leave the machine
//!
//! JavaScript runs in an embedded engine with `console.log`, `console.error`
//! and `console.warn` captured. Python gets a best-effort treatment: `print`
//! calls and comments are rewritten so the source can run in the same engine.
//! Anything beyond simple expressions fails, and the report says so.

use boa_engine::{Context, Source};
use regex::Regex;

use crate::errors::CodeLabError;
use crate::report::Report;

/// Loop iterations a script may run before it is stopped.
pub const DEFAULT_LOOP_ITERATION_LIMIT: u64 = 1_000_000;

const OUTPUT_BUFFER: &str = "__codelab_output";

const CONSOLE_PRELUDE: &str = r#"
var __codelab_output = [];
function __codelab_capture() {
    var parts = [];
    for (var i = 0; i < arguments.length; i++) {
        var arg = arguments[i];
        parts.push(typeof arg === 'object' ? JSON.stringify(arg, null, 2) : String(arg));
    }
    __codelab_output.push(parts.join(' ') + '\n');
}
var console = { log: __codelab_capture, error: __codelab_capture, warn: __codelab_capture };
"#;

const PRINT_PRELUDE: &str = r#"
var __codelab_output = [];
function printFunction() {
    var parts = [];
    for (var i = 0; i < arguments.length; i++) {
        parts.push(String(arguments[i]));
    }
    __codelab_output.push(parts.join(' ') + '\n');
}
var console = { log: printFunction };
"#;

/// What a script printed, and the value of its last expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptOutput {
    pub printed: String,
    pub completion: Option<String>,
}

/// Report of one local run.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRun {
    pub succeeded: bool,
    pub report: Report,
}

#[derive(Debug, Clone, Copy)]
pub struct ScriptEngine {
    loop_iteration_limit: u64,
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self {
            loop_iteration_limit: DEFAULT_LOOP_ITERATION_LIMIT,
        }
    }
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loop_iteration_limit(mut self, limit: u64) -> Self {
        self.loop_iteration_limit = limit;
        self
    }

    pub async fn run_javascript(&self, code: &str) -> LocalRun {
        let mut report = Report::new();
        match self.evaluate_blocking(CONSOLE_PRELUDE, code.to_string()).await {
            Ok(output) => {
                report.push("✅ JavaScript execution completed:");
                report.extend(output.printed.lines());
                if let Some(value) = output.completion {
                    report.push(format!("Return value: {}", value));
                }
                LocalRun {
                    succeeded: true,
                    report,
                }
            }
            Err(e) => {
                log::debug!("JavaScript evaluation failed: {}", e);
                report.push(format!("❌ JavaScript Error: {}", e));
                LocalRun {
                    succeeded: false,
                    report,
                }
            }
        }
    }

    /// Simple evaluation of a Python subset: `print`, arithmetic, strings.
    pub async fn run_python(&self, code: &str) -> LocalRun {
        let mut report = Report::new();
        let evaluated = match python_to_script(code) {
            Ok(script) => self.evaluate_blocking(PRINT_PRELUDE, script).await,
            Err(e) => Err(e),
        };

        match evaluated {
            Ok(output) if !output.printed.is_empty() => {
                report.push("⚠️ Simple Python evaluation:");
                report.extend(output.printed.lines());
                report.push(
                    "📝 Note: Limited Python support. For full Python features, configure a backend id for python.",
                );
                LocalRun {
                    succeeded: true,
                    report,
                }
            }
            Ok(_) => {
                report.push("⚠️ Simple evaluation completed (no output generated)");
                LocalRun {
                    succeeded: true,
                    report,
                }
            }
            Err(e) => {
                log::debug!("Simple Python evaluation failed: {}", e);
                report.push(format!("❌ Simple Python evaluation failed: {}", e));
                report.push("💡 Suggestions:");
                report.push("   • Try simpler Python expressions");
                report.push("   • Check for syntax errors");
                report.push("   • Configure a backend id for python to run it remotely");
                LocalRun {
                    succeeded: false,
                    report,
                }
            }
        }
    }

    async fn evaluate_blocking(
        &self,
        prelude: &'static str,
        code: String,
    ) -> Result<ScriptOutput, CodeLabError> {
        let limit = self.loop_iteration_limit;
        tokio::task::spawn_blocking(move || evaluate(prelude, &code, limit))
            .await
            .map_err(|e| CodeLabError::Script(format!("Script runner stopped: {}", e)))?
    }
}

/// Run `code` after `prelude` in a fresh engine context.
fn evaluate(prelude: &str, code: &str, loop_iteration_limit: u64) -> Result<ScriptOutput, CodeLabError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(loop_iteration_limit);

    context
        .eval(Source::from_bytes(prelude))
        .map_err(|e| CodeLabError::Script(e.to_string()))?;

    let value = match context.eval(Source::from_bytes(code)) {
        Ok(value) => value,
        Err(err) => {
            let message = err
                .try_native(&mut context)
                .map(|native| native.to_string())
                .unwrap_or_else(|_| err.to_string());
            return Err(CodeLabError::Script(message));
        }
    };

    let completion = if value.is_undefined() {
        None
    } else {
        let text = value
            .to_string(&mut context)
            .map_err(|e| CodeLabError::Script(e.to_string()))?;
        Some(text.to_std_string_escaped())
    };

    let printed = context
        .eval(Source::from_bytes(&format!("{}.join('')", OUTPUT_BUFFER)))
        .and_then(|joined| joined.to_string(&mut context))
        .map_err(|e| CodeLabError::Script(e.to_string()))?
        .to_std_string_escaped();

    Ok(ScriptOutput { printed, completion })
}

/// Rewrite the Python subset into a script for the engine.
pub fn python_to_script(code: &str) -> Result<String, CodeLabError> {
    let rewrites = [
        (r"print\s*\(", "printFunction("),
        (r"print\s+(.+)", "printFunction(${1})"),
        (r"(?m)^\s*#.*", ""),
        (r"'''|\x22\x22\x22", "`"),
    ];

    let mut script = code.to_string();
    for (pattern, replacement) in rewrites {
        let re = Regex::new(pattern).map_err(|e| CodeLabError::Script(e.to_string()))?;
        script = re.replace_all(&script, replacement).into_owned();
    }
    Ok(script)
}
