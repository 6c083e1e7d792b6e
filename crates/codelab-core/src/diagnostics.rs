//! Advisory syntax heuristics used when no execution endpoint is reachable.
//!
//! These are substring and delimiter-count checks. They never run code and a
//! clean result does not mean the program is correct.

use crate::language::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub language: Language,
    pub issues: Vec<String>,
}

impl DiagnosticReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "🔍 Performing basic syntax check for {}...",
            self.language.label()
        )];
        if self.issues.is_empty() {
            lines.push("✅ No obvious syntax issues found!".to_string());
        } else {
            lines.push("⚠️ Potential issues found:".to_string());
            lines.extend(self.issues.iter().map(|issue| format!("   • {}", issue)));
        }
        lines
    }
}

pub fn check_syntax(language: Language, code: &str) -> DiagnosticReport {
    let issues = match language {
        Language::Java => check_java(code),
        Language::Cpp => check_cpp(code),
        Language::Mysql => check_sql(code),
        _ => Vec::new(),
    };
    DiagnosticReport { language, issues }
}

fn check_java(code: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if !code.contains("public class") {
        issues.push("Missing \"public class\" declaration".to_string());
    }
    if !code.contains("public static void main") {
        issues.push("Missing main method".to_string());
    }
    issues.extend(mismatch("braces", code, '{', '}'));
    issues.extend(mismatch("parentheses", code, '(', ')'));
    issues
}

fn check_cpp(code: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if !code.contains("#include") {
        issues.push("Missing #include directives".to_string());
    }
    if !code.contains("int main") {
        issues.push("Missing main function".to_string());
    }
    issues.extend(mismatch("braces", code, '{', '}'));
    if !code.contains("return") {
        issues.push("Main function should return a value".to_string());
    }
    issues
}

const SQL_KEYWORDS: [&str; 7] = ["SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER"];

fn check_sql(code: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let upper = code.to_uppercase();
    if !SQL_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        issues.push("No SQL keywords found".to_string());
    }
    issues.extend(mismatch("parentheses", code, '(', ')'));
    issues
}

fn mismatch(name: &str, code: &str, open: char, close: char) -> Option<String> {
    let opened = code.matches(open).count();
    let closed = code.matches(close).count();
    (opened != closed).then(|| format!("Mismatched {}: {} open, {} close", name, opened, closed))
}
