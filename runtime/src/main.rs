// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use shelfscan_runtime::cli;
use shelfscan_runtime::config::{self, CrawlConfig};
use shelfscan_runtime::crawler::CrawlOptions;
use shelfscan_runtime::renderer::NavigateOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shelfscan",
    about = "Shelfscan: extract a storefront's product catalog",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "Run 'shelfscan' with no command to crawl using category_links.json."
)]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    crawl: CrawlArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl all categories and write the product catalog (default)
    Crawl(CrawlArgs),
    /// Run extraction over a saved page, e.g. a debug artifact
    Extract {
        /// Saved HTML document
        html_file: PathBuf,
        /// URL the page was served from (resolves relative links)
        #[arg(long)]
        url: String,
        /// Captured JSON response bodies to mine alongside the page
        #[arg(long = "responses", num_args = 1..)]
        responses: Vec<PathBuf>,
    },
    /// Check environment and configuration
    Doctor {
        /// Category file (JSON object of name -> URL)
        #[arg(long, default_value = config::DEFAULT_CATEGORY_FILE)]
        categories: PathBuf,
        /// Storefront base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Args, Clone)]
struct CrawlArgs {
    /// Category file (JSON object of name -> URL)
    #[arg(long, default_value = config::DEFAULT_CATEGORY_FILE)]
    categories: PathBuf,
    /// Storefront base URL; used as the catalog source and to resolve
    /// relative category URLs
    #[arg(long)]
    base_url: Option<String>,
    /// Output catalog path
    #[arg(long, short, default_value = config::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// Directory for debug screenshots and HTML
    #[arg(long, default_value = config::DEFAULT_DEBUG_DIR)]
    debug_dir: PathBuf,
    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "60000")]
    timeout: u64,
    /// Settle delay after each page load in milliseconds
    #[arg(long, default_value = "800")]
    settle_ms: u64,
    /// Delay between listing pages in milliseconds
    #[arg(long, default_value = "400")]
    page_delay_ms: u64,
    /// Maximum pages per category
    #[arg(long)]
    max_pages: Option<u32>,
    /// Scroll passes per page to trigger lazy loading
    #[arg(long, default_value = "6")]
    scroll_steps: u32,
    /// Fetch pages over plain HTTP instead of a headless browser
    #[arg(long)]
    http_only: bool,
    /// Do not write debug screenshots/HTML
    #[arg(long)]
    no_debug_capture: bool,
}

impl CrawlArgs {
    fn into_config(self) -> CrawlConfig {
        CrawlConfig {
            categories_path: self.categories,
            base_url: self.base_url,
            output: self.output,
            debug_dir: self.debug_dir,
            debug_capture: !self.no_debug_capture,
            http_only: self.http_only,
            crawl: CrawlOptions {
                navigate: NavigateOptions {
                    timeout_ms: self.timeout,
                    settle_ms: self.settle_ms,
                    scroll_steps: self.scroll_steps,
                    ..Default::default()
                },
                page_delay_ms: self.page_delay_ms,
                max_pages: self.max_pages,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Global flags are read back by cli::output.
    if cli.quiet {
        std::env::set_var("SHELFSCAN_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("SHELFSCAN_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("SHELFSCAN_NO_COLOR", "1");
    }
    cli::logging::init(cli.verbose, cli.quiet, cli.json_logs);

    // Exit codes: 0 = products written, 1 = error, 2 = no products found.
    let code = match cli.command {
        None => crawl(cli.crawl).await,
        Some(Commands::Crawl(args)) => crawl(args).await,
        Some(Commands::Extract {
            html_file,
            url,
            responses,
        }) => report(cli::extract_cmd::run(&html_file, &url, &responses).await),
        Some(Commands::Doctor {
            categories,
            base_url,
        }) => report(cli::doctor::run(&categories, base_url.as_deref()).await),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shelfscan", &mut std::io::stdout());
            0
        }
    };
    std::process::exit(code);
}

async fn crawl(args: CrawlArgs) -> i32 {
    match cli::crawl_cmd::run(args.into_config()).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => report::<()>(Err(e)),
    }
}

fn report<T>(result: anyhow::Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("  Error: {e:#}");
            1
        }
    }
}
