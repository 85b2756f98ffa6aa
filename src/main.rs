use std::{process, sync::Arc};

use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use yojitsu::{
    application::{
        error::AppError,
        export::{ExportSite, export_wxr},
        extract::ExtractOptions,
        fix::{FixOptions, fix_posts},
        render::{ArticleLoader, PrerenderOptions, StoreSource, prerender_site},
        sitemap::generate_sitemap,
        structure::check_posts,
        sync::{build_store, category_breakdown, write_store},
    },
    config,
    domain::articles::ArticleStore,
    infra::{
        fs::write_atomic,
        store::{FileStoreSource, HttpStoreSource, read_store_file},
        telemetry,
    },
    util::dates::{parse_iso_date, today_utc},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Sync(args) => {
            run_sync(&settings, args.fallback_date.as_deref(), false).map(drop)
        }
        config::Command::Fix(args) => run_fix(&settings, args.dry_run),
        config::Command::Check(_) => run_check(&settings),
        config::Command::Sitemap(_) => run_sitemap(&settings),
        config::Command::Export(_) => run_export(&settings),
        config::Command::Prerender(_) => run_prerender(&settings).await,
        config::Command::Build(args) => run_build(&settings, args.dry_run),
    }
}

fn run_sync(
    settings: &config::Settings,
    fallback_date: Option<&str>,
    dry_run: bool,
) -> Result<ArticleStore, AppError> {
    let fallback_date = match fallback_date {
        Some(value) => parse_iso_date(value).ok_or_else(|| {
            AppError::validation(format!("--fallback-date `{value}` is not a YYYY-MM-DD date"))
        })?,
        None => today_utc(),
    };
    let options = ExtractOptions {
        posts_prefix: settings.site.posts_prefix(),
        fallback_date,
    };

    let report = build_store(&settings.site.posts_dir, &options)?;
    if !dry_run {
        write_store(&report.store, &settings.site.store_path)?;
    }

    for (category, count) in category_breakdown(&report.store) {
        info!(
            target = "yojitsu::sync",
            category = category.as_str(),
            count,
            "Category total"
        );
    }
    info!(
        target = "yojitsu::sync",
        store = %settings.site.store_path.display(),
        articles = report.store.articles.len(),
        degraded = report.degraded(),
        failed = report.failures.len(),
        dry_run,
        "Article store built"
    );
    Ok(report.store)
}

fn run_fix(settings: &config::Settings, dry_run: bool) -> Result<(), AppError> {
    let options = FixOptions {
        base_href: settings.site.base_href.clone(),
        public_url: settings.site.public_url.clone(),
        posts_prefix: settings.site.posts_prefix(),
        dry_run,
        backup_dir: settings.fix.backup.then(|| settings.fix.backup_dir.clone()),
    };

    let report = fix_posts(&settings.site.posts_dir, &options)?;
    if let Some(backup) = report.backup.as_ref() {
        info!(target = "yojitsu::fix", backup = %backup.display(), "Posts backed up");
    }
    info!(
        target = "yojitsu::fix",
        processed = report.processed,
        changed = report.changed.len(),
        skipped_rules = report.skipped.len(),
        failed = report.failures.len(),
        dry_run,
        "Fix completed"
    );
    Ok(())
}

fn run_check(settings: &config::Settings) -> Result<(), AppError> {
    let report = check_posts(&settings.site.posts_dir)?;
    info!(
        target = "yojitsu::check",
        checked = report.checked,
        incomplete = report.incomplete.len(),
        failed = report.failures.len(),
        "Structure check completed"
    );

    if report.is_clean() {
        return Ok(());
    }
    Err(AppError::StructureCheck {
        files: report.incomplete.len() + report.failures.len(),
        violations: report.violations(),
    })
}

fn load_store(settings: &config::Settings) -> Result<ArticleStore, AppError> {
    let store = read_store_file(&settings.site.store_path)?;
    store.validate()?;
    Ok(store)
}

fn run_sitemap(settings: &config::Settings) -> Result<(), AppError> {
    let store = load_store(settings)?;
    write_sitemap(settings, &store, false)
}

fn write_sitemap(
    settings: &config::Settings,
    store: &ArticleStore,
    dry_run: bool,
) -> Result<(), AppError> {
    let xml = generate_sitemap(store, &settings.site.base_url, today_utc())
        .map_err(|err| AppError::validation(err.to_string()))?;
    if !dry_run {
        write_atomic(&settings.site.sitemap_path, &xml)?;
    }

    info!(
        target = "yojitsu::sitemap",
        path = %settings.site.sitemap_path.display(),
        articles = store.articles.len(),
        dry_run,
        "Sitemap generated"
    );
    Ok(())
}

fn run_export(settings: &config::Settings) -> Result<(), AppError> {
    let store = load_store(settings)?;
    let site = ExportSite::new(&settings.site.public_url)
        .map_err(|err| AppError::validation(err.to_string()))?;
    let export = export_wxr(
        &store,
        &settings.site.posts_dir,
        &site,
        OffsetDateTime::now_utc(),
    )
    .map_err(|err| AppError::unexpected(err.to_string()))?;
    write_atomic(&settings.site.export_path, &export.xml)?;

    if !export.without_content.is_empty() {
        warn!(
            target = "yojitsu::export",
            articles = ?export.without_content,
            "Exported without body"
        );
    }
    info!(
        target = "yojitsu::export",
        path = %settings.site.export_path.display(),
        items = export.items,
        "Export written"
    );
    Ok(())
}

async fn run_prerender(settings: &config::Settings) -> Result<(), AppError> {
    let source: Arc<dyn StoreSource> = match settings.render.fetch_url.as_ref() {
        Some(url) => Arc::new(HttpStoreSource::new(url.clone())),
        None => Arc::new(FileStoreSource::new(settings.site.store_path.clone())),
    };
    let loader = ArticleLoader::new(source);
    let options = PrerenderOptions {
        related_limit: settings.render.related_limit,
        load_timeout: settings.render.load_timeout,
        public_url: settings.site.public_url.clone(),
        base_href: settings.site.base_href.clone(),
        posts_prefix: settings.site.posts_prefix(),
    };

    let started = Instant::now();
    let report = prerender_site(
        &settings.site.root,
        &settings.site.posts_dir,
        &settings.render.output_dir,
        &loader,
        &options,
    )
    .await?;

    info!(
        target = "yojitsu::prerender",
        output = %settings.render.output_dir.display(),
        rendered = report.rendered,
        related_hidden = report.related_hidden,
        failed = report.failures.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Prerender completed"
    );
    Ok(())
}

fn run_build(settings: &config::Settings, dry_run: bool) -> Result<(), AppError> {
    info!(target = "yojitsu::build", dry_run, "Starting build");
    run_fix(settings, dry_run)?;
    let store = run_sync(settings, None, dry_run)?;
    write_sitemap(settings, &store, dry_run)?;
    info!(target = "yojitsu::build", "Build completed");
    Ok(())
}
