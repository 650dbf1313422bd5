use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wporg_asset_cdn::config::{DEFAULT_CONFIG_FILE, RewriterConfig};
use wporg_asset_cdn::versioning::ModificationTimeLookup;
use wporg_asset_cdn::{AssetKind, AssetUrlRewriter, Environment, unix_now};

/// Command-line front end for the asset URL rewriter.
#[derive(Debug, Parser)]
#[command(name = "wporg-asset-cdn")]
#[command(about = "Rewrite WordPress.org asset URLs onto the s.w.org CDN", long_about = None)]
pub struct Cli {
    /// JSON configuration file. Defaults to ./wporg-cdn.config.json when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Rewrite asset URLs given as arguments, or one per line on stdin.
    Rewrite {
        /// URLs to rewrite.
        urls: Vec<String>,

        #[command(flatten)]
        site: SiteArgs,

        /// Loader filter the URLs are attributed to in logs.
        #[arg(long, value_enum, default_value_t = KindArg::Script)]
        kind: KindArg,

        /// Fixed Unix time to rewrite against instead of the system clock.
        #[arg(long)]
        now: Option<u64>,
    },

    /// Print the effective configuration as JSON.
    ShowConfig {
        #[command(flatten)]
        site: SiteArgs,
    },
}

/// Per-invocation overrides of the configuration file.
#[derive(Debug, Default, clap::Args)]
pub struct SiteArgs {
    /// Site URL eligible links start with.
    #[arg(long)]
    pub site_url: Option<String>,

    /// Document root used for modification-time lookups.
    #[arg(long)]
    pub abspath: Option<PathBuf>,

    /// Request host used when the CDN is not in use.
    #[arg(long)]
    pub host: Option<String>,

    /// Environment type (local, development, staging, production).
    #[arg(long)]
    pub environment: Option<Environment>,

    /// Use the CDN even outside production.
    #[arg(long)]
    pub use_cdn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    Style,
    Script,
}

impl From<KindArg> for AssetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Style => AssetKind::Style,
            KindArg::Script => AssetKind::Script,
        }
    }
}

impl SiteArgs {
    fn apply(self, config: &mut RewriterConfig) {
        if let Some(site_url) = self.site_url {
            config.site_url = site_url;
        }
        if let Some(abspath) = self.abspath {
            config.abspath = abspath;
        }
        if let Some(host) = self.host {
            config.request_host = host;
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if self.use_cdn {
            config.use_wporg_cdn = true;
        }
    }
}

fn load_config(path: Option<PathBuf>, site: SiteArgs) -> Result<RewriterConfig> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = RewriterConfig::load_from_path(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?
        .with_process_env();
    site.apply(&mut config);
    tracing::debug!("loaded config: {:?}", config);
    Ok(config)
}

/// Rewrite each URL, reading them from `input` when none were given on the command line.
fn rewrite_urls<L, R, W>(
    rewriter: &AssetUrlRewriter<L>,
    kind: AssetKind,
    now: u64,
    urls: Vec<String>,
    input: R,
    output: &mut W,
) -> Result<()>
where
    L: ModificationTimeLookup,
    R: BufRead,
    W: Write,
{
    let mut emit = |link: &str| -> Result<()> {
        let rewritten = rewriter.filter_loader_src(kind, link, "cli", now);
        writeln!(output, "{rewritten}").context("failed to write output")
    };

    if urls.is_empty() {
        for line in input.lines() {
            let line = line.context("failed to read stdin")?;
            let link = line.trim();
            if !link.is_empty() {
                emit(link)?;
            }
        }
    } else {
        for link in &urls {
            emit(link)?;
        }
    }

    Ok(())
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let Cli { config, command } = Cli::parse();

        match command {
            CliCommand::Rewrite {
                urls,
                site,
                kind,
                now,
            } => {
                let config = load_config(config, site)?;
                let rewriter = AssetUrlRewriter::new(config.to_context());
                let now = now.unwrap_or_else(unix_now);
                let stdout = io::stdout();
                let mut output = stdout.lock();
                rewrite_urls(
                    &rewriter,
                    kind.into(),
                    now,
                    urls,
                    io::stdin().lock(),
                    &mut output,
                )?;
            }
            CliCommand::ShowConfig { site } => {
                let config = load_config(config, site)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }

        Ok(())
    }
}
