//! Configuration tests
//!
//! The shipped config files must parse and expand to the built-in targets.

use pretty_assertions::assert_eq;
use statscrape::config::{variants, ScraperConfig};
use std::path::{Path, PathBuf};

fn shipped(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config").join(name)
}

#[test]
fn test_shipped_dunkest_config_matches_builtin() {
    let config = ScraperConfig::load(&shipped("dunkest.toml")).unwrap();
    let targets = config.targets().unwrap().targets;

    let builtin = variants::dunkest_weeks(
        variants::DEFAULT_SEASON,
        &(1..=43).collect::<Vec<_>>(),
        Path::new("results"),
        config.run.timing(),
    )
    .unwrap();

    assert_eq!(targets.len(), 43);
    for (from_file, from_code) in targets.iter().zip(&builtin) {
        assert_eq!(from_file.url, from_code.url);
        assert_eq!(from_file.output, from_code.output);
        assert_eq!(from_file.label, from_code.label);
        assert_eq!(*from_file.layout, *from_code.layout);
    }
    assert_eq!(
        targets[42].output,
        Path::new("results").join("2024-2025").join("week_43.csv")
    );
}

#[test]
fn test_shipped_givemestats_config() {
    let config = ScraperConfig::load(&shipped("givemestats.toml")).unwrap();
    let targets = config.targets().unwrap().targets;

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].url, variants::GIVEMESTATS_URL);
    assert_eq!(
        targets[0].output,
        Path::new("results").join("givemestats_domestic_stats.csv")
    );
    assert_eq!(targets[0].timing.page_cap, 20);
}

#[test]
fn test_missing_config_file() {
    let err = ScraperConfig::load(Path::new("/nonexistent/statscrape.toml")).unwrap_err();
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn test_invalid_week_template_url() {
    let config = ScraperConfig::from_toml_str(
        r#"
        [[targets]]
        variant = "dunkest"
        url = "not a url {WEEK}"
        params = "1"
        output = "x.csv"
        "#,
    )
    .unwrap();
    assert!(config.targets().is_err());
}
