use std::path::Path;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.site.root = Some(PathBuf::from("/srv/site"));
    raw.logging.level = Some("info".to_string());

    let command = Command::Sync(SyncArgs {
        site: SiteOverrides {
            root: Some(PathBuf::from("/tmp/site")),
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        fallback_date: None,
    });

    raw.apply_command_overrides(&command);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.site.root, Path::new("/tmp/site"));
    assert_eq!(settings.site.posts_dir, Path::new("/tmp/site/blog/posts"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_mirror_site_layout() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.site.posts_dir, Path::new("./blog/posts"));
    assert_eq!(settings.site.store_path, Path::new("./blog/articles.json"));
    assert_eq!(settings.site.sitemap_path, Path::new("./sitemap.xml"));
    assert_eq!(settings.site.export_path, Path::new("./blog-export.xml"));
    assert_eq!(settings.site.base_url, "https://yojitsu.com");
    assert_eq!(settings.site.base_href, "/yojitsu-website/");
    assert_eq!(settings.site.posts_prefix(), "blog/posts");
    assert!(settings.fix.backup);
    assert_eq!(settings.render.related_limit, 3);
    assert_eq!(settings.render.load_timeout, Duration::from_secs(10));
    assert_eq!(settings.render.output_dir, Path::new("./dist"));
    assert!(settings.render.fetch_url.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let command = Command::Check(CheckArgs {
        site: SiteOverrides {
            log_json: Some(true),
            ..Default::default()
        },
    });

    raw.apply_command_overrides(&command);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn invalid_values_name_their_key() {
    let mut raw = RawSettings::default();
    raw.render.related_limit = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero limit");
    assert!(matches!(err, LoadError::Invalid { key: "render.related_limit", .. }));

    let mut raw = RawSettings::default();
    raw.site.base_url = Some("ftp://yojitsu.com".to_string());
    let err = Settings::from_raw(raw).expect_err("bad scheme");
    assert!(matches!(err, LoadError::Invalid { key: "site.base_url", .. }));

    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));

    let mut raw = RawSettings::default();
    raw.site.posts_dir = Some(PathBuf::new());
    let err = Settings::from_raw(raw).expect_err("empty path");
    assert!(matches!(err, LoadError::Invalid { key: "site.posts_dir", .. }));
}

#[test]
fn base_href_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.base_href = Some("/blog-site".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.base_href, "/blog-site/");
}

#[test]
fn parse_fix_arguments() {
    let args = CliArgs::parse_from(["yojitsu", "fix", "--dry-run", "--no-backup", "--root", "site"]);

    match args.command {
        Command::Fix(fix) => {
            assert!(fix.dry_run);
            assert!(fix.no_backup);
            assert_eq!(fix.site.root.as_deref(), Some(Path::new("site")));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_prerender_arguments() {
    let args = CliArgs::parse_from([
        "yojitsu",
        "prerender",
        "--fetch-url",
        "https://example.com/blog/articles.json",
        "--load-timeout-ms",
        "250",
    ]);

    let mut raw = RawSettings::default();
    raw.apply_command_overrides(&args.command);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.render.fetch_url.as_deref(),
        Some("https://example.com/blog/articles.json")
    );
    assert_eq!(settings.render.load_timeout, Duration::from_millis(250));
}

#[test]
fn sitemap_overrides_apply_only_to_sitemap() {
    let args = CliArgs::parse_from([
        "yojitsu",
        "sitemap",
        "--base-url",
        "https://staging.yojitsu.com",
        "--output",
        "public/sitemap.xml",
    ]);

    let mut raw = RawSettings::default();
    raw.apply_command_overrides(&args.command);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.site.base_url, "https://staging.yojitsu.com");
    assert_eq!(settings.site.sitemap_path, Path::new("./public/sitemap.xml"));
    assert_eq!(settings.site.export_path, Path::new("./blog-export.xml"));
}
