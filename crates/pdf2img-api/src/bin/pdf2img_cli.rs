//! Dev/ops CLI front-end (spec.md §6), matching `riptide-api::main::Args`'s
//! derive-style `clap::Parser` usage but exposing the conversion knobs an
//! operator drives directly rather than the service's `--bind`/`--config`
//! surface. Talks to the Dispatcher in-process; no HTTP round-trip.

use clap::Parser;
use pdf2img_dispatcher::{Dispatcher, DispatcherConfig};
use pdf2img_pool::{WorkerPool, WorkerPoolConfig};
use pdf2img_types::{CancelToken, ImageFormat, PageSelector, PdfInput, PageOutput, RenderOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pdf2img")]
#[command(about = "Convert a PDF to raster images from the command line")]
struct Args {
    /// Local file path or URL of the PDF to convert.
    input: String,

    /// Output directory for rendered images.
    #[arg(short = 'o', long, default_value = "./output")]
    output_dir: PathBuf,

    /// Comma-separated 1-based page list; omit for the first 6 pages.
    #[arg(short = 'p', long)]
    pages: Option<String>,

    /// Target output width in pixels.
    #[arg(short = 'w', long, default_value_t = 1280)]
    width: u32,

    /// Encode quality, 0-100 (webp/jpeg only).
    #[arg(short = 'q', long, default_value_t = 80)]
    quality: u8,

    /// Output format.
    #[arg(short = 'f', long, default_value = "webp")]
    format: String,

    /// Minimum compression effort, skip optional post-processing.
    #[arg(long)]
    fast: bool,

    /// Print page count and dimensions only; don't write files.
    #[arg(long)]
    info: bool,

    /// Object-store key prefix (enables sink-key output instead of local files).
    #[arg(long)]
    sink_prefix: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let exit_code = run(args).await;
    std::process::exit(exit_code);
}

async fn run(args: Args) -> i32 {
    let format = match ImageFormat::parse(&args.format) {
        Some(f) => f,
        None => {
            eprintln!("invalid format '{}': expected webp, png, or jpg", args.format);
            return 2;
        }
    };

    let selector = match &args.pages {
        None => PageSelector::default(),
        Some(csv) => {
            let mut raw = Vec::new();
            for part in csv.split(',') {
                match part.trim().parse::<i64>() {
                    Ok(n) => raw.push(n),
                    Err(_) => {
                        eprintln!("invalid page list '{csv}': expected comma-separated integers");
                        return 2;
                    }
                }
            }
            PageSelector::normalize(raw)
        }
    };

    let input = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        PdfInput::Url(args.input.clone())
    } else {
        PdfInput::LocalPath(args.input.clone())
    };

    let options = RenderOptions {
        target_width: args.width,
        quality: args.quality,
        format,
        fast: args.fast,
        ..RenderOptions::default()
    };
    if let Err(e) = options.validate() {
        eprintln!("invalid options: {e}");
        return 2;
    }

    let pool = WorkerPool::new(WorkerPoolConfig {
        worker_count: num_cpus::get().max(2),
        idle_timeout: Duration::from_secs(10),
        queue_capacity: 64,
    });
    let dispatcher = Dispatcher::new(pool.clone(), DispatcherConfig::default());

    let result = dispatcher
        .convert(input, selector, options, CancelToken::new(), None)
        .await;

    pool.shutdown().await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("conversion failed: {}: {}", e.kind, e.message);
            return 1;
        }
    };

    if args.info {
        println!(
            "pages: {} total, {} rendered, {}x? @ {:?}",
            result.num_pages_total, result.num_rendered, result.pages.first().map(|p| p.width).unwrap_or(0), result.format
        );
        return 0;
    }

    if result.num_rendered == 0 {
        eprintln!("no pages rendered");
        return 1;
    }

    if let Some(prefix) = &args.sink_prefix {
        for page in &result.pages {
            if page.success {
                println!("{}/{}.{}", prefix, page.page_num, result.format.extension());
            }
        }
        return 0;
    }

    if let Err(e) = std::fs::create_dir_all(&args.output_dir) {
        eprintln!("failed to create output directory: {e}");
        return 1;
    }

    let mut any_failed = false;
    for page in &result.pages {
        if !page.success {
            eprintln!(
                "page {}: {} ({})",
                page.page_num,
                page.error_message.as_deref().unwrap_or("unknown error"),
                page.error_kind.map(|k| k.to_string()).unwrap_or_default()
            );
            any_failed = true;
            continue;
        }
        let Some(PageOutput::Bytes(bytes)) = &page.output else {
            continue;
        };
        let path = args
            .output_dir
            .join(format!("page_{}.{}", page.page_num, result.format.extension()));
        if let Err(e) = std::fs::write(&path, bytes) {
            eprintln!("failed to write {}: {e}", path.display());
            any_failed = true;
        } else {
            println!("{}", path.display());
        }
    }

    if any_failed {
        1
    } else {
        0
    }
}
