use anyhow::Context;
use clap::{Parser, Subcommand};
use fabrix_api::{RestApi, SharedRepository};
use fabrix_core::{Compilation, NetworkConfig};
use fabrix_storage::MemoryRepository;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Hyperledger Fabric topology compiler
#[derive(Parser, Debug)]
#[command(name = "fabrix")]
#[command(about = "Compile Fabric network topologies into configtx, crypto-config and docker-compose files", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API
    Serve(ServeArgs),
    /// Compile a topology file into the three documents
    Render {
        /// NetworkConfig JSON document
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "./artifacts")]
        out_dir: PathBuf,
    },
    /// Print the validation report of a topology file
    Validate {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Start with an empty repository
    #[arg(long)]
    no_sample: bool,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 5000,
            no_sample: false,
        }
    }
}

fn read_network(path: &Path) -> anyhow::Result<NetworkConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(serve_args) => serve(serve_args).await,
        Command::Render { input, out_dir } => render(&input, &out_dir),
        Command::Validate { input } => validate(&input),
    }
}

fn render(input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let network = read_network(input)?;
    let result = Compilation::run(&network);
    for path in result.artifacts.write_to(out_dir)? {
        println!("wrote {}", path.display());
    }

    for test in &result.report.tests {
        println!("{:<28} {:?}", test.name, test.status);
    }
    for issue in result.report.issues.iter().chain(&result.graph_issues) {
        warn!(rule = %issue.rule, "{}", issue.title);
    }
    if result.report.has_errors() {
        warn!("Topology has validation errors; documents were still generated");
    }
    Ok(())
}

fn validate(input: &Path) -> anyhow::Result<()> {
    let network = read_network(input)?;
    let report = fabrix_core::validate_network(Some(&network));
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("Starting fabrix v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP API port: {}", args.http_port);

    let repository: SharedRepository = if args.no_sample {
        Arc::new(MemoryRepository::new())
    } else {
        Arc::new(MemoryRepository::with_sample_data())
    };
    info!("Repository initialized");

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(repository, &host, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("fabrix started successfully");
    info!("HTTP API: http://localhost:{}/api/networks", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
