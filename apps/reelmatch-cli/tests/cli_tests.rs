use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use reelmatch_cli::{run, Cli, Commands};

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("reelmatch.toml");
    fs::write(&path, body).expect("write config");
    path.display().to_string()
}

async fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    run(&cli, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn parses_global_flags_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "reelmatch", "recommend", "Inception", "-k", "3", "--sample", "--strategy", "on_demand",
        "--json",
    ])
    .expect("parse");
    assert!(cli.sample);
    assert_eq!(cli.strategy.as_deref(), Some("on_demand"));
    match cli.command {
        Commands::Recommend { title_or_id, k, enrich, json } => {
            assert_eq!(title_or_id, "Inception");
            assert_eq!(k, Some(3));
            assert!(!enrich);
            assert!(json);
        }
        other => panic!("unexpected command {other:?}"),
    }
    let conflicting = Cli::try_parse_from(["reelmatch", "info", "--sample", "--data", "x.json"]);
    assert!(conflicting.is_err(), "--sample conflicts with --data");
}

#[tokio::test]
async fn recommend_on_the_sample_prints_a_ranked_table() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), "");
    let args = [
        "reelmatch", "--config", config.as_str(), "--sample", "recommend", "Finding Nemo", "-k",
        "2",
    ];
    let text = run_args(&args).await.expect("run");
    assert!(text.starts_with("Because you picked 'Finding Nemo':"), "{text}");
    let first_row = text.lines().nth(2).expect("first result");
    assert!(first_row.contains("Toy Story"), "{text}");
    assert_eq!(text.lines().count(), 4);
}

#[tokio::test]
async fn json_output_is_machine_readable() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), "[ranking]\ndefault_k = 3\n");
    let args = ["reelmatch", "--config", config.as_str(), "--sample", "recommend", "603", "--json"];
    let text = run_args(&args).await.expect("run");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    let results = value.as_array().expect("array");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["id"] != "603"));
    let score = |i: usize| results[i]["score"].as_f64().expect("score");
    assert!(score(0) >= score(1));
}

#[tokio::test]
async fn data_file_from_config_and_titles_listing() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("catalogue.jsonl"),
        concat!(
            r#"{"id": "a", "title": "Alpha", "genres": "Action", "overview": "heist"}"#, "\n",
            r#"{"id": "b", "title": "Beta", "genres": "Action", "overview": "heist crew"}"#, "\n",
            r#"{"id": "c", "title": "Gamma", "genres": "Comedy", "overview": "picnic"}"#, "\n",
        ),
    )
    .expect("data");
    let config = write_config(tmp.path(), "[data]\nsource = \"catalogue.jsonl\"\n");

    let args = ["reelmatch", "--config", config.as_str(), "titles", "--limit", "2"];
    let titles = run_args(&args).await.expect("titles");
    assert_eq!(titles.lines().count(), 2);
    assert!(titles.contains("Alpha") && titles.contains("Beta") && !titles.contains("Gamma"));

    let args = ["reelmatch", "--config", config.as_str(), "--strategy", "full", "info"];
    let info = run_args(&args).await.expect("info");
    assert!(info.contains("items:     3"), "{info}");
    assert!(info.contains("strategy:  full_matrix"), "{info}");
}

#[tokio::test]
async fn unknown_titles_and_bad_flags_are_caller_errors() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), "");

    let args = ["reelmatch", "--config", config.as_str(), "--sample", "recommend", "Zardoz"];
    let err = run_args(&args).await.expect_err("unknown");
    let core = err.downcast_ref::<reelmatch_core::Error>().expect("core error");
    assert!(core.is_caller_error());

    let args = [
        "reelmatch", "--config", config.as_str(), "--sample", "--strategy", "sideways", "info",
    ];
    let err = run_args(&args).await.expect_err("bad strategy");
    assert!(matches!(
        err.downcast_ref::<reelmatch_core::Error>(),
        Some(reelmatch_core::Error::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn external_without_api_key_prints_an_empty_list() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), "");
    let args = ["reelmatch", "--config", config.as_str(), "--sample", "external", "Inception"];
    let text = run_args(&args).await.expect("run");
    assert_eq!(text.trim(), "No external recommendations for 'Inception'.");
}
