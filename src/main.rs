mod commands;
mod core;
mod hack;
mod mcp;
mod release;
mod utils;

use clap::{Parser, Subcommand};
use commands::{HackRequest, PlanRequest};
use core::context::ReleaseContext;
use core::error::{ReleaseError, ReleaseResult, print_error};
use mcp::{McpServer, Transport};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Automate OpenShift Pipelines releases over MCP
#[derive(Parser)]
#[command(name = "release-mcp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Path to release-mcp.toml (defaults to the built-in release tables)
  #[arg(long, global = true, env = "RELEASE_MCP_CONFIG")]
  config: Option<PathBuf>,

  /// Log filter, e.g. `info` or `release_mcp=debug`
  #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Server
  // ============================================================================
  /// Serve the release tools over MCP
  Serve {
    /// Transport to listen on
    #[arg(long, value_enum, default_value = "http")]
    transport: Transport,
    /// Listen address for the HTTP transport
    #[arg(long, default_value = ":3000")]
    address: String,
  },

  // ============================================================================
  // Tools
  // ============================================================================
  /// Create release-v{minor}.x branches in every component repository
  Branches {
    /// Minor version, e.g. 1.21
    #[arg(long)]
    minor_version: String,
  },

  /// Configure the hack repository for a release and open a pull request
  Hack {
    /// Minor version, e.g. 1.21
    #[arg(long)]
    minor_version: String,
    /// OpenShift Container Platform version
    #[arg(long)]
    ocp_version: Option<String>,
    /// Upstream version of a component, as component=version (repeatable)
    #[arg(long = "upstream", value_parser = parse_upstream)]
    upstream: Vec<(String, String)>,
  },

  /// Create ReleasePlan and ReleasePlanAdmission files and push a merge request
  Plans {
    /// Minor version, e.g. 1.21
    #[arg(long)]
    minor_version: String,
    /// Patch version, e.g. 2
    #[arg(long)]
    patch_version: Option<String>,
    /// OCP version for the FBC admissions (repeatable, defaults to the configured list)
    #[arg(long = "ocp-version")]
    ocp_versions: Vec<String>,
  },

  // ============================================================================
  // Offline
  // ============================================================================
  /// Render the release documents into a local directory
  Render {
    /// Minor version, e.g. 1.21
    #[arg(long)]
    minor_version: String,
    /// Patch version, e.g. 2
    #[arg(long)]
    patch_version: Option<String>,
    /// OCP version for the FBC admissions (repeatable, defaults to the configured list)
    #[arg(long = "ocp-version")]
    ocp_versions: Vec<String>,
    /// Root of the release data tree to write into
    #[arg(long)]
    output: PathBuf,
  },

  /// Rewrite the branches section of local repository configs
  UpdateBranches {
    /// Minor version, e.g. 1.21
    #[arg(long)]
    minor_version: String,
    /// Upstream version of a component, as component=version (repeatable)
    #[arg(long = "upstream", value_parser = parse_upstream)]
    upstream: Vec<(String, String)>,
    /// Directory holding one YAML config per repository
    #[arg(long)]
    repos_dir: PathBuf,
  },
}

fn parse_upstream(value: &str) -> Result<(String, String), String> {
  match value.split_once('=') {
    Some((component, version)) if !component.is_empty() && !version.is_empty() => {
      Ok((component.to_string(), version.to_string()))
    }
    _ => Err(format!("expected component=version, got '{}'", value)),
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr; stdout belongs to tool output and the stdio transport
fn init_tracing(filter: &str) {
  let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(&cli.log_level);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(ReleaseError::from(e).context("Failed to get current directory")),
  };

  let ctx = match ReleaseContext::load(cli.config.as_deref(), &cwd) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  match run(ctx, cli.command) {
    Ok(Some(text)) => println!("{}", text),
    Ok(None) => {}
    Err(err) => handle_error(err),
  }
}

fn run(ctx: ReleaseContext, command: Commands) -> ReleaseResult<Option<String>> {
  let text = match command {
    Commands::Serve { transport, address } => {
      serve(ctx, transport, &address)?;
      return Ok(None);
    }

    Commands::Branches { minor_version } => commands::run_create_release_branches(&ctx, &minor_version)?,
    Commands::Hack {
      minor_version,
      ocp_version,
      upstream,
    } => {
      let request = HackRequest {
        minor: minor_version,
        ocp_version,
        upstream_versions: upstream_map(upstream),
      };
      commands::run_configure_hack_repo(&ctx, &request)?
    }
    Commands::Plans {
      minor_version,
      patch_version,
      ocp_versions,
    } => commands::run_create_release_plans(&ctx, &PlanRequest::new(minor_version, patch_version, ocp_versions))?,

    Commands::Render {
      minor_version,
      patch_version,
      ocp_versions,
      output,
    } => commands::run_render(&ctx, &PlanRequest::new(minor_version, patch_version, ocp_versions), &output)?,
    Commands::UpdateBranches {
      minor_version,
      upstream,
      repos_dir,
    } => commands::run_update_branches(&ctx, &minor_version, &upstream_map(upstream), &repos_dir)?,
  };
  Ok(Some(text))
}

fn serve(ctx: ReleaseContext, transport: Transport, address: &str) -> ReleaseResult<()> {
  let server = McpServer::new(ctx);
  match transport {
    Transport::Stdio => mcp::serve_stdio(&server),
    Transport::Http => {
      let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ReleaseError::from(e).context("Failed to start async runtime"))?;
      runtime.block_on(mcp::serve_http(server, address))
    }
  }
}

fn upstream_map(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
  pairs.into_iter().collect()
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
