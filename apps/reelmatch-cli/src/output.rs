//! Human and JSON rendering of command results.
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use reelmatch_core::types::{Meta, Recommendation};
use reelmatch_hybrid::{EnrichedRecommendation, ExternalRecommendation};

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn meta_text(metadata: &Meta, key: &str) -> String {
    match metadata.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn recommendations(
    out: &mut dyn Write,
    query: &str,
    results: &[Recommendation],
) -> anyhow::Result<()> {
    if results.is_empty() {
        writeln!(out, "No recommendations for '{query}'.")?;
        return Ok(());
    }
    writeln!(out, "Because you picked '{query}':")?;
    writeln!(
        out,
        "{:>3}  {:>6}  {:>8}  {:<32} {:>6} {:>6}",
        "#", "score", "id", "title", "year", "rating"
    )?;
    for (i, r) in results.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:>6.3}  {:>8}  {:<32} {:>6} {:>6}",
            i + 1,
            r.score,
            r.id,
            r.title,
            meta_text(&r.metadata, "year"),
            meta_text(&r.metadata, "vote_average"),
        )?;
    }
    Ok(())
}

pub fn enriched(
    out: &mut dyn Write,
    query: &str,
    results: &[EnrichedRecommendation],
) -> anyhow::Result<()> {
    let plain: Vec<Recommendation> = results.iter().map(|r| r.recommendation.clone()).collect();
    recommendations(out, query, &plain)?;
    for r in results {
        let Some(details) = &r.details else { continue };
        writeln!(out)?;
        writeln!(out, "{} ({})", r.recommendation.title, r.recommendation.id)?;
        if let Some(overview) = &details.overview {
            writeln!(out, "  {overview}")?;
        }
        if let Some(poster) = &details.poster_url {
            writeln!(out, "  poster: {poster}")?;
        }
    }
    Ok(())
}

pub fn external(
    out: &mut dyn Write,
    query: &str,
    results: &[ExternalRecommendation],
) -> anyhow::Result<()> {
    if results.is_empty() {
        writeln!(out, "No external recommendations for '{query}'.")?;
        return Ok(());
    }
    for (i, r) in results.iter().enumerate() {
        let local = if r.position.is_some() { "" } else { "  (not in catalogue)" };
        writeln!(out, "{:>3}  {:>8}  {}{}", i + 1, r.id, r.title, local)?;
    }
    Ok(())
}
