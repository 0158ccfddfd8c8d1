//! webflow-sitemap - XML sitemaps for Webflow CMS sites
//!
//! Main entry point for the webflow-sitemap CLI.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use webflow_sitemap::aggregator::{aggregate_site, SiteData};
use webflow_sitemap::cms::WebflowConnector;
use webflow_sitemap::config::{validate_config_result, AppConfig};
use webflow_sitemap::server::SitemapServer;
use webflow_sitemap::sitemap::{normalize_base_url, CollectionSelection, LanguageConfig};
use webflow_sitemap::SitemapError;

/// webflow-sitemap - Generate XML sitemaps from a Webflow site
#[derive(Parser, Debug)]
#[command(name = "webflow-sitemap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/webflow-sitemap/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (default: server.addr from config, port from $PORT)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Fetch a site's pages and collections and print them as JSON
    Fetch {
        #[command(flatten)]
        site: SiteArgs,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a site and render its sitemap
    Generate {
        #[command(flatten)]
        site: SiteArgs,

        /// Site URL, e.g. https://example.com (default: sitemap.base_url from config)
        #[arg(short, long)]
        base_url: Option<String>,

        /// Static page to include, as PATH or PATH=PRIORITY (default: all pages)
        #[arg(short, long = "page")]
        pages: Vec<String>,

        /// Collection to include, as SLUG or SLUG=PRIORITY (default: all collections)
        #[arg(long = "collection")]
        collections: Vec<String>,

        /// Language variant, as CODE or CODE:FOLDER; the first is the default
        #[arg(short, long = "lang")]
        languages: Vec<LanguageConfig>,

        /// Priority for selections without an explicit one
        #[arg(long)]
        priority: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Credentials of the site to fetch
#[derive(clap::Args, Debug)]
struct SiteArgs {
    /// Webflow API token
    #[arg(long, env = "WEBFLOW_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Webflow site ID
    #[arg(long, env = "WEBFLOW_SITE_ID")]
    site_id: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Quiet by default, the server logs requests
    let level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    if let Err(e) = webflow_sitemap::logging::init(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> webflow_sitemap::Result<()> {
    if let Commands::Init { force } = cli.command {
        return handle_init_command(&cli.config, force);
    }

    let config = load_config(&cli.config)?;
    validate_config_result(&config)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Serve { addr } => handle_serve_command(&config, addr).await,
        Commands::Fetch { site, output } => {
            let data = fetch_site(&config, &site).await?;
            let json = serde_json::to_string_pretty(&data)?;
            write_output(output.as_ref(), &json)
        }
        Commands::Generate {
            site,
            base_url,
            pages,
            collections,
            languages,
            priority,
            output,
        } => {
            let base_url = base_url
                .or_else(|| config.sitemap.base_url.clone())
                .unwrap_or_default();
            // Fail before any request is made
            normalize_base_url(&base_url)?;

            let data = fetch_site(&config, &site).await?;
            let priority = priority.unwrap_or_else(|| config.sitemap.default_priority.clone());

            let mut request = data.select_all(&base_url, &priority);
            if !pages.is_empty() {
                request.selected_static_entries = pages
                    .iter()
                    .map(|arg| {
                        let (path, page_priority) = split_priority(arg, &priority);
                        if !data.static_pages.iter().any(|p| p.published_path == path) {
                            tracing::warn!(path = %path, "Page not found on site, including anyway");
                        }
                        data.static_selection(path, page_priority)
                    })
                    .collect();
            }
            if !collections.is_empty() {
                request.selected_collections = collections
                    .iter()
                    .map(|arg| {
                        let (slug, slug_priority) = split_priority(arg, &priority);
                        CollectionSelection::new(slug).with_priority(slug_priority)
                    })
                    .collect();
            }
            request.language_configs = if languages.is_empty() {
                config.sitemap.languages.clone()
            } else {
                languages
            };

            let xml = request.generate(&data.collection_items)?;
            write_output(output.as_ref(), &xml)
        }
    }
}

/// Load the config given with `-c`, or the default file when it exists
fn load_config(config_path: &Option<String>) -> webflow_sitemap::Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_or_default(),
    }
}

fn handle_init_command(config_path: &Option<String>, force: bool) -> webflow_sitemap::Result<()> {
    let config_file = match config_path {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_path(),
    };

    if config_file.exists() && !force {
        println!("Configuration already exists at {}", config_file.display());
        println!();
        println!("To overwrite it with defaults, run:");
        println!("  webflow-sitemap init --force");
        return Ok(());
    }

    AppConfig::new().save(&config_file)?;

    println!("✓ Created configuration at {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. Set sitemap.base_url and sitemap.languages in the file");
    println!();
    println!("  2. Generate a sitemap:");
    println!("     webflow-sitemap generate --api-key <token> --site-id <id>");

    Ok(())
}

async fn handle_serve_command(
    config: &AppConfig,
    addr: Option<String>,
) -> webflow_sitemap::Result<()> {
    let addr = match addr {
        Some(addr) => addr,
        None => listen_addr(&config.server.addr, std::env::var("PORT").ok().as_deref())?,
    };

    SitemapServer::new(config)
        .run(&addr)
        .await
        .map_err(|e| SitemapError::Other(e.to_string()))
}

/// Configured listen address with the port replaced by `$PORT` when set
fn listen_addr(configured: &str, port: Option<&str>) -> webflow_sitemap::Result<String> {
    let Some(port) = port else {
        return Ok(configured.to_string());
    };

    let mut addr: SocketAddr = configured
        .parse()
        .map_err(|_| SitemapError::Config(format!("Invalid listen address: {}", configured)))?;
    let port = port
        .trim()
        .parse::<u16>()
        .map_err(|_| SitemapError::Config(format!("Invalid PORT: {}", port)))?;
    addr.set_port(port);
    Ok(addr.to_string())
}

async fn fetch_site(config: &AppConfig, site: &SiteArgs) -> webflow_sitemap::Result<SiteData> {
    let connector = WebflowConnector::new(config.cms.clone());
    let data = aggregate_site(
        &connector,
        &site.api_key,
        &site.site_id,
        (&config.cms).into(),
    )
    .await?;

    tracing::info!(
        site_id = %site.site_id,
        urls = data.url_count(),
        "Site fetched"
    );
    Ok(data)
}

/// Split `NAME=PRIORITY`, falling back to `default` when no priority is given
fn split_priority<'a>(arg: &'a str, default: &'a str) -> (&'a str, &'a str) {
    match arg.rsplit_once('=') {
        Some((name, priority)) if !priority.trim().is_empty() => (name.trim(), priority.trim()),
        Some((name, _)) => (name.trim(), default),
        None => (arg.trim(), default),
    }
}

fn write_output(output: Option<&PathBuf>, content: &str) -> webflow_sitemap::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
