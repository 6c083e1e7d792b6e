//! Project download bundles
//!
//! The buffer is packed as `<project>.zip` holding the source file and a
//! README. If the archive cannot be built the buffer is offered as a single
//! plain-text file instead.

use chrono::NaiveDate;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::CodeLabError;
use crate::language::{Language, LanguageSpec};

pub const DEFAULT_PROJECT_NAME: &str = "My Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Zip,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub file_name: String,
    pub kind: BundleKind,
    pub bytes: Vec<u8>,
}

impl Bundle {
    pub fn status_line(&self) -> String {
        match self.kind {
            BundleKind::Zip => format!("📦 Downloaded: {}", self.file_name),
            BundleKind::PlainText => format!("📄 Downloaded: {}", self.file_name),
        }
    }

    pub async fn save(&self, dir: &Path) -> Result<PathBuf, CodeLabError> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await.map_err(|e| {
            CodeLabError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Input for one download.
pub struct ProjectSource<'a> {
    pub project_name: &'a str,
    pub language: Language,
    pub spec: &'a LanguageSpec,
    pub code: &'a str,
    pub date: NaiveDate,
}

/// File stem for a project: non-alphanumerics become `_`, lower-cased.
pub fn sanitize_project_name(name: &str) -> String {
    let name = if name.trim().is_empty() {
        DEFAULT_PROJECT_NAME
    } else {
        name
    };
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

pub fn run_instructions(language: Language, file_name: &str) -> String {
    match language {
        Language::Python => format!("python3 {}", file_name),
        Language::Java => format!("javac {} && java Main", file_name),
        Language::Cpp => format!("g++ {} -o main && ./main", file_name),
        Language::Mysql => format!("mysql -u <user> -p <database> < {}", file_name),
        Language::Html => format!("Open {} in a web browser", file_name),
        Language::Css => format!("Link {} from an HTML page and open it in a web browser", file_name),
        Language::Javascript => format!("node {}", file_name),
    }
}

pub fn readme(source: &ProjectSource<'_>, code_file: &str) -> String {
    let name = if source.project_name.trim().is_empty() {
        DEFAULT_PROJECT_NAME
    } else {
        source.project_name
    };
    format!(
        "# {name}\n\nLanguage: {label}\nCreated with: CodeLab Student Code Editor\nDate: {date}\n\n## Files\n- {file}: Main {tag} source code\n\n## Instructions\nTo run this code:\n{run}\n\nGenerated by CodeLab - Student Code Editor\n",
        name = name,
        label = source.language.label(),
        date = source.date.format("%Y-%m-%d"),
        file = code_file,
        tag = source.language.tag(),
        run = run_instructions(source.language, code_file),
    )
}

/// Build the download for a buffer. Empty buffers are rejected.
pub fn package_project(source: &ProjectSource<'_>) -> Result<Bundle, CodeLabError> {
    package_with(source, build_zip)
}

/// Same as [`package_project`], with the archive step supplied by the caller.
fn package_with<F>(source: &ProjectSource<'_>, archive: F) -> Result<Bundle, CodeLabError>
where
    F: FnOnce(&ProjectSource<'_>, &str) -> Result<Vec<u8>, CodeLabError>,
{
    if source.code.trim().is_empty() {
        return Err(CodeLabError::Packaging("No code to download.".to_string()));
    }

    let stem = sanitize_project_name(source.project_name);
    let code_file = format!("{}.{}", stem, source.spec.extension);

    match archive(source, &code_file) {
        Ok(bytes) => Ok(Bundle {
            file_name: format!("{}.zip", stem),
            kind: BundleKind::Zip,
            bytes,
        }),
        Err(e) => {
            log::warn!("Zip packaging failed, falling back to a single file: {}", e);
            Ok(Bundle {
                file_name: code_file,
                kind: BundleKind::PlainText,
                bytes: source.code.as_bytes().to_vec(),
            })
        }
    }
}

fn build_zip(source: &ProjectSource<'_>, code_file: &str) -> Result<Vec<u8>, CodeLabError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(code_file, options)?;
    writer.write_all(source.code.as_bytes())?;

    writer.start_file("README.md", options)?;
    writer.write_all(readme(source, code_file).as_bytes())?;

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
