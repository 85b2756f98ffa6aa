//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "yojitsu";
const DEFAULT_SITE_ROOT: &str = ".";
const DEFAULT_POSTS_DIR: &str = "blog/posts";
const DEFAULT_STORE_PATH: &str = "blog/articles.json";
const DEFAULT_SITEMAP_PATH: &str = "sitemap.xml";
const DEFAULT_EXPORT_PATH: &str = "blog-export.xml";
const DEFAULT_BASE_URL: &str = "https://yojitsu.com";
const DEFAULT_PUBLIC_URL: &str = "https://yamada1001.github.io/yojitsu-website/";
const DEFAULT_BASE_HREF: &str = "/yojitsu-website/";
const DEFAULT_BACKUP_DIR: &str = "blog/posts-backup";
const DEFAULT_RELATED_LIMIT: usize = 3;
const DEFAULT_LOAD_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Command-line arguments for the yojitsu binary.
#[derive(Debug, Parser)]
#[command(name = "yojitsu", version, about = "Yojitsu blog content pipeline")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "YOJITSU_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Rebuild the article store from the article pages.
    Sync(SyncArgs),
    /// Insert missing structural elements into every article page.
    Fix(FixArgs),
    /// Report article pages missing required elements.
    Check(CheckArgs),
    /// Write sitemap.xml from the article store.
    Sitemap(SitemapArgs),
    /// Write a WordPress WXR export of every article.
    Export(ExportArgs),
    /// Prerender store-driven sections into the output directory.
    Prerender(PrerenderArgs),
    /// Run fix, sync and sitemap in sequence.
    Build(BuildArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct SiteOverrides {
    /// Override the site root directory.
    #[arg(long = "root", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Override the posts directory, relative to the site root.
    #[arg(long = "posts-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub posts_dir: Option<PathBuf>,

    /// Override the article store path, relative to the site root.
    #[arg(long = "store-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub store_path: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Date (YYYY-MM-DD) used for pages without `datePublished`; defaults to today.
    #[arg(long = "fallback-date", value_name = "DATE")]
    pub fallback_date: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FixArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Report what would change without writing files.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Skip the backup copy of the posts directory.
    #[arg(long = "no-backup", action = clap::ArgAction::SetTrue)]
    pub no_backup: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub site: SiteOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SitemapArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Override the canonical base URL of sitemap locations.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the sitemap output path, relative to the site root.
    #[arg(long = "output", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Override the public URL used for links in the export.
    #[arg(long = "public-url", value_name = "URL")]
    pub public_url: Option<String>,

    /// Override the export output path, relative to the site root.
    #[arg(long = "output", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PrerenderArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Override the directory prerendered pages are written to.
    #[arg(long = "output-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Fetch the article store over HTTP instead of reading it from disk.
    #[arg(long = "fetch-url", value_name = "URL")]
    pub fetch_url: Option<String>,

    /// Override the store load timeout in milliseconds.
    #[arg(long = "load-timeout-ms", value_name = "MILLIS")]
    pub load_timeout_ms: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub site: SiteOverrides,

    /// Run every step without writing pages, the store or the sitemap.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,
}

impl Command {
    pub fn site_overrides(&self) -> &SiteOverrides {
        match self {
            Command::Sync(args) => &args.site,
            Command::Fix(args) => &args.site,
            Command::Check(args) => &args.site,
            Command::Sitemap(args) => &args.site,
            Command::Export(args) => &args.site,
            Command::Prerender(args) => &args.site,
            Command::Build(args) => &args.site,
        }
    }
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub fix: FixSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Site layout. Every path is already joined onto `root`.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub root: PathBuf,
    pub posts_dir: PathBuf,
    pub store_path: PathBuf,
    pub sitemap_path: PathBuf,
    pub export_path: PathBuf,
    pub base_url: String,
    pub public_url: String,
    pub base_href: String,
}

impl SiteSettings {
    /// Site-relative prefix of article paths in the store.
    pub fn posts_prefix(&self) -> String {
        self.posts_dir
            .strip_prefix(&self.root)
            .unwrap_or(&self.posts_dir)
            .to_string_lossy()
            .replace('\\', "/")
            .trim_matches('/')
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct FixSettings {
    pub backup: bool,
    pub backup_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub related_limit: usize,
    pub load_timeout: Duration,
    pub fetch_url: Option<String>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("YOJITSU").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_command_overrides(&cli.command);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    fix: RawFixSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_command_overrides(&mut self, command: &Command) {
        self.apply_site_overrides(command.site_overrides());

        match command {
            Command::Fix(args) => {
                if args.no_backup {
                    self.fix.backup = Some(false);
                }
            }
            Command::Sitemap(args) => {
                if let Some(url) = args.base_url.as_ref() {
                    self.site.base_url = Some(url.clone());
                }
                if let Some(path) = args.output.as_ref() {
                    self.site.sitemap_path = Some(path.clone());
                }
            }
            Command::Export(args) => {
                if let Some(url) = args.public_url.as_ref() {
                    self.site.public_url = Some(url.clone());
                }
                if let Some(path) = args.output.as_ref() {
                    self.site.export_path = Some(path.clone());
                }
            }
            Command::Prerender(args) => {
                if let Some(dir) = args.output_dir.as_ref() {
                    self.render.output_dir = Some(dir.clone());
                }
                if let Some(url) = args.fetch_url.as_ref() {
                    self.render.fetch_url = Some(url.clone());
                }
                if let Some(ms) = args.load_timeout_ms {
                    self.render.load_timeout_ms = Some(ms);
                }
            }
            Command::Sync(_) | Command::Check(_) | Command::Build(_) => {}
        }
    }

    fn apply_site_overrides(&mut self, overrides: &SiteOverrides) {
        if let Some(root) = overrides.root.as_ref() {
            self.site.root = Some(root.clone());
        }
        if let Some(dir) = overrides.posts_dir.as_ref() {
            self.site.posts_dir = Some(dir.clone());
        }
        if let Some(path) = overrides.store_path.as_ref() {
            self.site.store_path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            site,
            fix,
            render,
        } = raw;

        let site = build_site_settings(site)?;
        let fix = build_fix_settings(fix, &site)?;
        let render = build_render_settings(render, &site)?;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            site,
            fix,
            render,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let root = non_empty_path(site.root, DEFAULT_SITE_ROOT, "site.root")?;
    let posts_dir = root.join(non_empty_path(site.posts_dir, DEFAULT_POSTS_DIR, "site.posts_dir")?);
    let store_path = root.join(non_empty_path(
        site.store_path,
        DEFAULT_STORE_PATH,
        "site.store_path",
    )?);
    let sitemap_path = root.join(non_empty_path(
        site.sitemap_path,
        DEFAULT_SITEMAP_PATH,
        "site.sitemap_path",
    )?);
    let export_path = root.join(non_empty_path(
        site.export_path,
        DEFAULT_EXPORT_PATH,
        "site.export_path",
    )?);

    let base_url = http_url(site.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL), "site.base_url")?;
    let public_url = http_url(
        site.public_url.as_deref().unwrap_or(DEFAULT_PUBLIC_URL),
        "site.public_url",
    )?;

    let mut base_href = site
        .base_href
        .unwrap_or_else(|| DEFAULT_BASE_HREF.to_string())
        .trim()
        .to_string();
    if !base_href.starts_with('/') {
        return Err(LoadError::invalid(
            "site.base_href",
            "must be an absolute path starting with `/`",
        ));
    }
    if !base_href.ends_with('/') {
        base_href.push('/');
    }

    Ok(SiteSettings {
        root,
        posts_dir,
        store_path,
        sitemap_path,
        export_path,
        base_url,
        public_url,
        base_href,
    })
}

fn build_fix_settings(fix: RawFixSettings, site: &SiteSettings) -> Result<FixSettings, LoadError> {
    Ok(FixSettings {
        backup: fix.backup.unwrap_or(true),
        backup_dir: site.root.join(non_empty_path(
            fix.backup_dir,
            DEFAULT_BACKUP_DIR,
            "fix.backup_dir",
        )?),
    })
}

fn build_render_settings(
    render: RawRenderSettings,
    site: &SiteSettings,
) -> Result<RenderSettings, LoadError> {
    let related_limit = render.related_limit.unwrap_or(DEFAULT_RELATED_LIMIT);
    if related_limit == 0 {
        return Err(LoadError::invalid(
            "render.related_limit",
            "must be greater than zero",
        ));
    }

    let load_timeout_ms = render.load_timeout_ms.unwrap_or(DEFAULT_LOAD_TIMEOUT_MS);
    if load_timeout_ms == 0 {
        return Err(LoadError::invalid(
            "render.load_timeout_ms",
            "must be greater than zero",
        ));
    }

    let fetch_url = render
        .fetch_url
        .filter(|url| !url.trim().is_empty())
        .map(|url| http_url(&url, "render.fetch_url"))
        .transpose()?;

    Ok(RenderSettings {
        related_limit,
        load_timeout: Duration::from_millis(load_timeout_ms),
        fetch_url,
        output_dir: site.root.join(non_empty_path(
            render.output_dir,
            DEFAULT_OUTPUT_DIR,
            "render.output_dir",
        )?),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    root: Option<PathBuf>,
    posts_dir: Option<PathBuf>,
    store_path: Option<PathBuf>,
    sitemap_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
    base_url: Option<String>,
    public_url: Option<String>,
    base_href: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFixSettings {
    backup: Option<bool>,
    backup_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    related_limit: Option<usize>,
    load_timeout_ms: Option<u64>,
    fetch_url: Option<String>,
    output_dir: Option<PathBuf>,
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

fn http_url(value: &str, key: &'static str) -> Result<String, LoadError> {
    let trimmed = value.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|err| LoadError::invalid(key, format!("failed to parse `{trimmed}`: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "scheme must be http or https"));
    }
    Ok(trimmed.to_string())
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
