use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use codelab_core::packaging;
use codelab_core::language::RunRoute;
use codelab_core::report::WriterSink;
use codelab_core::{ConfigLoader, Language, OutputSink, Workbench};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(name = "codelab", author, version, about = "CodeLab student code editor")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, default_value = "codelab.yaml", help = "Configuration file")]
    config: PathBuf,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Write logs to this file instead of stderr")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a source file
    Run {
        file: PathBuf,

        #[clap(long, help = "Language tag; inferred from the file extension when omitted")]
        language: Option<String>,

        #[clap(long, help = "Where to write the HTML preview for html/css files")]
        preview_out: Option<PathBuf>,
    },
    /// Check which execution endpoint is reachable
    Status,
    /// Package a source file into a zip download
    Package {
        file: PathBuf,

        #[clap(long)]
        language: Option<String>,

        #[clap(long, help = "Project name; defaults to the configured one")]
        project: Option<String>,

        #[clap(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the starter template for a language
    Template { language: String },
    /// List supported languages
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = ConfigLoader::from_file_or_default(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let workbench = Workbench::from_config(&config);
    let mut console = WriterSink::new(std::io::stdout());

    match cli.command {
        Commands::Run {
            file,
            language,
            preview_out,
        } => {
            let language = resolve_language(language.as_deref(), &file)?;
            let code = read_source(&file).await?;

            let run = workbench.run(language, &code).await;
            run.report.write_to(&mut console);

            if let Some(preview) = &run.preview {
                let path = preview_out.unwrap_or_else(|| file.with_extension("preview.html"));
                tokio::fs::write(&path, &preview.html)
                    .await
                    .with_context(|| format!("writing preview to {}", path.display()))?;
                console.append(&format!("🖥️ Preview written to {}", path.display()));
            }

            if !run.status.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Status => {
            console.append(&workbench.status_line().await);
        }
        Commands::Package {
            file,
            language,
            project,
            out_dir,
        } => {
            let language = resolve_language(language.as_deref(), &file)?;
            let code = read_source(&file).await?;
            let workbench = match project {
                Some(name) => workbench.with_project_name(name),
                None => workbench,
            };
            log::info!(
                "Packaging {} as project '{}'",
                file.display(),
                workbench.project_name()
            );

            match workbench.package(language, &code, packaging::today()) {
                Ok(bundle) => {
                    bundle.save(&out_dir).await?;
                    console.append(&bundle.status_line());
                }
                Err(e) => {
                    console.append(&format!("❌ {}", e));
                    std::process::exit(1);
                }
            }
        }
        Commands::Template { language } => {
            let language: Language = language.parse()?;
            print!("{}", workbench.template(language));
        }
        Commands::Languages => {
            let languages = workbench.languages();
            for (language, spec) in languages.iter() {
                console.append(&format!(
                    "{:<12} .{:<6} {:<14} {}",
                    language.tag(),
                    spec.extension,
                    spec.editor_mode,
                    describe_route(languages.route(*language))
                ));
            }
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);

    match &cli.log_file {
        Some(path) => {
            use std::fs::OpenOptions;

            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;

            env_logger::Builder::new()
                .filter_level(log_level_filter)
                .target(env_logger::Target::Pipe(Box::new(log_file)))
                .init();
        }
        None => {
            env_logger::Builder::new()
                .filter_level(log_level_filter)
                .target(env_logger::Target::Stderr)
                .init();
        }
    }
    Ok(())
}

fn describe_route(route: RunRoute) -> String {
    match route {
        RunRoute::Remote(id) => format!("remote ({})", id),
        RunRoute::HtmlPreview | RunRoute::CssPreview => "preview".to_string(),
        RunRoute::LocalJavaScript => "local".to_string(),
        RunRoute::LocalPython => "local (simple)".to_string(),
        RunRoute::Unsupported => "disabled".to_string(),
    }
}

fn resolve_language(explicit: Option<&str>, file: &Path) -> Result<Language> {
    if let Some(tag) = explicit {
        return Ok(tag.parse()?);
    }
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match Language::from_extension(ext) {
        Some(language) => Ok(language),
        None => bail!(
            "Cannot infer language from '{}'; pass --language",
            file.display()
        ),
    }
}

async fn read_source(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_language_from_extension() {
        assert_eq!(
            resolve_language(None, Path::new("Main.java")).unwrap(),
            Language::Java
        );
        assert_eq!(
            resolve_language(Some("c++"), Path::new("whatever.txt")).unwrap(),
            Language::Cpp
        );
        assert!(resolve_language(None, Path::new("notes.txt")).is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from(["codelab", "--log-level", "debug", "run", "main.cpp"]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Run { file, language, .. } => {
                assert_eq!(file, PathBuf::from("main.cpp"));
                assert!(language.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_describe_route() {
        assert_eq!(describe_route(RunRoute::Remote(62)), "remote (62)");
        assert_eq!(describe_route(RunRoute::LocalJavaScript), "local");
        assert_eq!(describe_route(RunRoute::CssPreview), "preview");
    }

    #[tokio::test]
    async fn test_read_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.sql");
        std::fs::write(&path, "SELECT 1;").unwrap();
        assert_eq!(read_source(&path).await.unwrap(), "SELECT 1;");
    }
}
