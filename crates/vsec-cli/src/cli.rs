//! Argument parsing and command execution.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use vsec_media::FfmpegRunner;
use vsec_models::{new_report_id, ReportRequest};
use vsec_report::{EmptyTextPolicy, ReportComposer, ReportError};

use crate::config::CliConfig;

/// Exit code for a failed render.
pub const EXIT_RENDER_FAILURE: u8 = 1;
/// Exit code for unusable input.
pub const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "vsec-report", version, about = "Video security analysis report generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a report to a PDF file
    Render(RenderArgs),
    /// Check that the environment can render reports
    Selfcheck,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Report identifier (a random short ID when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// File holding the analysis text, or `-` for stdin
    #[arg(long, value_name = "FILE|-")]
    pub text: String,

    /// Destination of the PDF
    #[arg(long, short)]
    pub output: PathBuf,

    /// Video to take the footage frame from
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Fail instead of rendering a report without body text
    #[arg(long, default_value_t = false)]
    pub reject_empty: bool,

    /// Directory for temporary thumbnails
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl RenderArgs {
    /// Apply command-line overrides on top of the environment config.
    pub fn apply(&self, mut config: CliConfig) -> CliConfig {
        if let Some(dir) = &self.temp_dir {
            config.temp_dir = Some(dir.clone());
        }
        if self.reject_empty {
            config.empty_text = EmptyTextPolicy::Reject;
        }
        config
    }

    /// Build the request, reading the text from its source.
    pub fn request(&self) -> Result<ReportRequest> {
        let text = read_text(&self.text)?;
        let id = self.id.clone().unwrap_or_else(new_report_id);

        let mut request = ReportRequest::new(id, text, self.output.to_string_lossy());
        if let Some(video) = &self.video {
            request = request.with_video(video.to_string_lossy());
        }
        Ok(request)
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli, config: CliConfig) -> Result<()> {
    match cli.command {
        Commands::Render(args) => render(&args, args.apply(config)),
        Commands::Selfcheck => selfcheck(&config),
    }
}

fn render(args: &RenderArgs, config: CliConfig) -> Result<()> {
    let request = args.request()?;
    let composer = ReportComposer::new(config.composer_config())?;

    info!(report_id = %request.report_id, output = %request.output_path, "Rendering report");
    let path = composer.compose(&request)?;

    if args.json {
        let summary = serde_json::json!({
            "report_id": request.report_id,
            "output": path,
        });
        println!("{}", summary);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn read_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read report text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("failed to read report text from {}", source))
}

fn selfcheck(config: &CliConfig) -> Result<()> {
    let temp_dir = config.effective_temp_dir();
    println!("vsec-report selfcheck: temp_dir={}", temp_dir.display());
    ensure_writable(&temp_dir)?;

    let runner = match &config.ffmpeg_bin {
        Some(bin) => FfmpegRunner::new().with_binary(bin),
        None => FfmpegRunner::new(),
    };
    match runner.locate() {
        Ok(path) => println!("vsec-report selfcheck: ffmpeg={}", path.display()),
        // Reports still render without footage frames
        Err(e) => println!("vsec-report selfcheck: ffmpeg unavailable ({}), thumbnails disabled", e),
    }

    println!("vsec-report selfcheck: ok");
    Ok(())
}

fn ensure_writable(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create temp dir {}", dir.display()))?;
    let probe = tempfile::Builder::new()
        .prefix(".vsec-selfcheck-")
        .tempfile_in(dir)
        .with_context(|| format!("temp dir {} is not writable", dir.display()))?;
    probe.close()?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    Ok(())
}

/// Process exit code for a failed run.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(report_err) = err.downcast_ref::<ReportError>() {
        return if report_err.is_input_error() {
            EXIT_INPUT_ERROR
        } else {
            EXIT_RENDER_FAILURE
        };
    }
    if err.downcast_ref::<io::Error>().is_some() {
        return EXIT_INPUT_ERROR;
    }
    EXIT_RENDER_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vsec_report::{InputError, RenderError};

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "vsec-report",
            "render",
            "--id",
            "abc",
            "--text",
            "notes.txt",
            "--output",
            "out.pdf",
            "--video",
            "cam.mp4",
            "--reject-empty",
        ])
        .unwrap();

        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.id.as_deref(), Some("abc"));
                assert_eq!(args.text, "notes.txt");
                assert_eq!(args.output, PathBuf::from("out.pdf"));
                assert_eq!(args.video, Some(PathBuf::from("cam.mp4")));
                assert!(args.reject_empty);
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_render_requires_output() {
        assert!(Cli::try_parse_from(["vsec-report", "render", "--text", "-"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vsec-report", "render", "--text", "-", "-o", "x.pdf", "--temp-dir", "/scratch",
            "--reject-empty",
        ])
        .unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        let config = args.apply(CliConfig {
            temp_dir: Some(PathBuf::from("/var/tmp")),
            ..CliConfig::default()
        });
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(config.empty_text, EmptyTextPolicy::Reject);
    }

    #[test]
    fn test_request_from_file_with_generated_id() {
        let dir = TempDir::new().unwrap();
        let text_path = dir.path().join("notes.txt");
        fs::write(&text_path, "First.\n\nSecond.").unwrap();

        let args = RenderArgs {
            id: None,
            text: text_path.to_string_lossy().to_string(),
            output: dir.path().join("out.pdf"),
            video: None,
            reject_empty: false,
            temp_dir: None,
            json: false,
        };
        let request = args.request().unwrap();
        assert_eq!(request.report_id.len(), 8);
        assert_eq!(request.report_text, "First.\n\nSecond.");
        assert!(request.video_path().is_none());
    }

    #[test]
    fn test_render_writes_pdf() {
        let dir = TempDir::new().unwrap();
        let text_path = dir.path().join("notes.txt");
        fs::write(&text_path, "Door forced at 02:10.").unwrap();
        let output = dir.path().join("report.pdf");

        let cli = Cli::try_parse_from([
            "vsec-report".to_string(),
            "render".to_string(),
            "--id".to_string(),
            "cli00001".to_string(),
            "--text".to_string(),
            text_path.to_string_lossy().to_string(),
            "--output".to_string(),
            output.to_string_lossy().to_string(),
        ])
        .unwrap();
        run(cli, CliConfig::default()).unwrap();
        assert!(fs::read(&output).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_exit_codes() {
        let input: anyhow::Error = ReportError::from(InputError::EmptyReportText).into();
        assert_eq!(exit_code(&input), EXIT_INPUT_ERROR);

        let render: anyhow::Error = ReportError::from(RenderError::encode("broken")).into();
        assert_eq!(exit_code(&render), EXIT_RENDER_FAILURE);

        let missing = read_text("/definitely/not/here.txt").unwrap_err();
        assert_eq!(exit_code(&missing), EXIT_INPUT_ERROR);
    }

    #[test]
    fn test_selfcheck_with_writable_dir() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig {
            temp_dir: Some(dir.path().to_path_buf()),
            ffmpeg_bin: Some("definitely-not-ffmpeg".to_string()),
            ..CliConfig::default()
        };
        selfcheck(&config).unwrap();
    }
}
