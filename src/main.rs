use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use receiptgen::{
    Delivery, ImageMode, ReceiptRequest, ReceiptService, RenderConfig, DEFAULT_MARGIN,
    DEFAULT_TOP_MARGIN,
};

#[derive(Parser, Debug)]
#[command(name = "receiptgen", version, about = "Generate fixed-layout rent receipts")]
struct Cli {
    /// TrueType font embedded in receipts
    #[arg(long, env = "RECEIPT_FONT", global = true)]
    font: Option<PathBuf>,

    /// Directory for generated files
    #[arg(long, env = "RECEIPT_OUTPUT_DIR", default_value = "output", global = true)]
    output_dir: PathBuf,

    /// Directory for backup copies
    #[arg(long, env = "RECEIPT_BACKUP_DIR", default_value = "output/backup", global = true)]
    backup_dir: PathBuf,

    /// Do not keep backup copies
    #[arg(long, global = true)]
    no_backup: bool,

    /// Raster resolution
    #[arg(long, default_value_t = 300.0, global = true)]
    dpi: f32,

    /// Side margin in points
    #[arg(long, default_value_t = DEFAULT_MARGIN, global = true)]
    margin: f32,

    /// Top and bottom margin in points
    #[arg(long, default_value_t = DEFAULT_TOP_MARGIN, global = true)]
    top_margin: f32,

    /// Purpose used when a request leaves it blank
    #[arg(long, default_value = "房租", global = true)]
    default_purpose: String,

    /// Seconds before a generated file is removed (worker mode)
    #[arg(long, default_value_t = 300, global = true)]
    cleanup_secs: u64,

    /// Seconds before the file behind a base64 response is removed (worker mode)
    #[arg(long, default_value_t = 60, global = true)]
    base64_cleanup_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical receipt data
    Info {
        /// Request JSON file, `-` for stdin
        request: PathBuf,
    },
    /// Generate the PDF receipt
    Pdf {
        request: PathBuf,
        /// Return the document as base64
        #[arg(long)]
        base64: bool,
    },
    /// Generate a PNG receipt
    Image {
        request: PathBuf,
        /// Draw directly instead of rasterizing the PDF
        #[arg(long)]
        direct: bool,
        #[arg(long)]
        base64: bool,
    },
    /// Inspect backup copies
    Backups {
        #[command(subcommand)]
        action: BackupCommand,
    },
    /// Serve JSON requests from stdin, one per line
    Worker,
}

#[derive(Subcommand, Debug)]
enum BackupCommand {
    List,
    Get {
        name: String,
        #[arg(long)]
        out: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> RenderConfig {
        RenderConfig {
            font_path: self.font.clone(),
            output_dir: self.output_dir.clone(),
            backup_dir: (!self.no_backup).then(|| self.backup_dir.clone()),
            dpi: self.dpi,
            margin: self.margin,
            top_margin: self.top_margin,
            default_purpose: self.default_purpose.clone(),
            file_cleanup_delay: Duration::from_secs(self.cleanup_secs),
            base64_cleanup_delay: Duration::from_secs(self.base64_cleanup_secs),
            ..Default::default()
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum JobKind {
    Pdf,
    Image,
    Info,
}

#[derive(Deserialize)]
struct Job {
    kind: JobKind,
    #[serde(default)]
    base64: bool,
    #[serde(default)]
    direct: bool,
    #[serde(flatten)]
    request: serde_json::Value,
}

#[derive(Serialize)]
struct Response {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn delivery(base64: bool) -> Delivery {
    if base64 {
        Delivery::Base64
    } else {
        Delivery::File
    }
}

fn image_mode(direct: bool) -> ImageMode {
    if direct {
        ImageMode::Direct
    } else {
        ImageMode::FromPdf
    }
}

fn read_request(path: &Path) -> anyhow::Result<ReceiptRequest> {
    let input = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    Ok(ReceiptRequest::from_json(&input)?)
}

/// One-shot commands exit right away, so nothing is scheduled for removal.
fn one_shot(config: RenderConfig) -> ReceiptService {
    ReceiptService::new(config).with_cleanup(None)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_job(service: &ReceiptService, job: Job) -> receiptgen::Result<serde_json::Value> {
    let req: ReceiptRequest = serde_json::from_value(job.request)?;
    let value = match job.kind {
        JobKind::Info => serde_json::to_value(service.preview(&req)?),
        JobKind::Pdf => serde_json::to_value(service.generate_pdf(&req, delivery(job.base64))?),
        JobKind::Image => serde_json::to_value(service.generate_image(
            &req,
            image_mode(job.direct),
            delivery(job.base64),
        )?),
    };
    value.map_err(|e| receiptgen::Error::Other(e.to_string()))
}

/// Answer one worker line.
fn respond(service: &ReceiptService, line: &str) -> Response {
    match serde_json::from_str::<Job>(line) {
        Ok(job) => match handle_job(service, job) {
            Ok(data) => Response { success: true, message: "ok".to_string(), data: Some(data) },
            Err(e) => {
                log::warn!("job failed: {}", e);
                Response { success: false, message: e.to_string(), data: None }
            }
        },
        Err(e) => Response { success: false, message: format!("Invalid request: {}", e), data: None },
    }
}

async fn worker_main(service: ReceiptService) -> anyhow::Result<()> {
    let service = Arc::new(service);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let svc = Arc::clone(&service);
        let response = tokio::task::spawn_blocking(move || respond(&svc, &line)).await?;
        let mut js = serde_json::to_string(&response)?;
        js.push('\n');
        out.write_all(js.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    match cli.command {
        Command::Worker => worker_main(ReceiptService::new(config)).await,
        Command::Info { request } => print_json(&one_shot(config).preview(&read_request(&request)?)?),
        Command::Pdf { request, base64 } => {
            print_json(&one_shot(config).generate_pdf(&read_request(&request)?, delivery(base64))?)
        }
        Command::Image { request, direct, base64 } => print_json(&one_shot(config).generate_image(
            &read_request(&request)?,
            image_mode(direct),
            delivery(base64),
        )?),
        Command::Backups { action: BackupCommand::List } => {
            print_json(&one_shot(config).store().list_backups()?)
        }
        Command::Backups { action: BackupCommand::Get { name, out } } => {
            let data = one_shot(config).store().read_backup(&name)?;
            std::fs::write(&out, &data).with_context(|| format!("writing {}", out.display()))?;
            println!("{} bytes written to {}", data.len(), out.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &Path) -> ReceiptService {
        let config = RenderConfig {
            font_path: Some(dir.join("missing.ttf")),
            output_dir: dir.join("out"),
            backup_dir: None,
            ..Default::default()
        };
        one_shot(config)
    }

    fn reply(service: &ReceiptService, line: &str) -> serde_json::Value {
        serde_json::to_value(respond(service, line)).unwrap()
    }

    #[test]
    fn info_job_returns_canonical_data() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let out = reply(
            &svc,
            r#"{"kind":"info","base64":true,"rent":"100.5","room_number":"101","recipient":"张三","payer":"李四","month":"2025年9月"}"#,
        );
        assert_eq!(out["success"], true);
        assert_eq!(out["message"], "ok");
        assert_eq!(out["data"]["id"], "NO101202509");
        assert_eq!(out["data"]["rent"], "100.50");
        assert_eq!(out["data"]["rent_zh"], "壹佰元伍角");
        assert_eq!(out["data"]["payer"], "李四");
    }

    #[test]
    fn job_flags_are_split_from_the_request() {
        let job: Job = serde_json::from_str(
            r#"{"kind":"image","direct":true,"rent":1,"room_number":"1","recipient":"a","payer":"b"}"#,
        )
        .unwrap();
        assert_eq!(job.kind, JobKind::Image);
        assert!(job.direct);
        assert!(!job.base64);
        let req: ReceiptRequest = serde_json::from_value(job.request).unwrap();
        assert_eq!(req.room_number, "1");
        assert_eq!(image_mode(job.direct), ImageMode::Direct);
        assert_eq!(delivery(job.base64), Delivery::File);
    }

    #[test]
    fn failures_use_the_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());

        let out = reply(&svc, "not json");
        assert_eq!(out["success"], false);
        assert!(out["message"].as_str().unwrap().starts_with("Invalid request"));
        assert!(out.get("data").is_none());

        let out = reply(&svc, r#"{"kind":"info","rent":1,"room_number":"1","recipient":"a","payer":" "}"#);
        assert_eq!(out["success"], false);
        assert!(out["message"].as_str().unwrap().contains("payer"));

        let out = reply(&svc, r#"{"kind":"pdf","rent":1,"room_number":"1","recipient":"a","payer":"b"}"#);
        assert_eq!(out["success"], false);
        assert!(out["message"].as_str().unwrap().starts_with("Document generation failed"));
        assert!(!dir.path().join("out").exists());
    }
}
