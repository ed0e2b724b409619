use std::env;
use std::path::PathBuf;

use reelmatch_core::config::{ColumnMapping, FilterConfig, SourceFormat, VectorizerConfig};
use reelmatch_core::loader::CorpusLoader;
use reelmatch_core::sample::sample_catalogue;
use reelmatch_core::source::open_source;
use reelmatch_core::traits::Vectorizer;
use reelmatch_text::TfidfVectorizer;

// Fit TF-IDF on a catalogue and print the heaviest terms per item.
// Usage:
//   cargo run -p reelmatch-text --example vectorize -- [path/to/catalogue.json] [--top 5]

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut path: Option<PathBuf> = None;
    let mut top: usize = 5;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--top" => {
                if i + 1 >= args.len() {
                    eprintln!("--top requires a number");
                    std::process::exit(2);
                }
                top = args[i + 1].parse().unwrap_or(top);
                i += 2; continue;
            }
            s if s.starts_with("-") => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            s => { path = Some(PathBuf::from(s)); i += 1; continue; }
        }
    }

    let loader = CorpusLoader::new(ColumnMapping::default(), FilterConfig::default());
    let corpus = match &path {
        Some(p) => loader.load(open_source(p, SourceFormat::Auto).as_ref())?,
        None => loader.load(&sample_catalogue())?,
    };
    let space = TfidfVectorizer::new(VectorizerConfig::default()).fit(&corpus)?;
    println!("{} items, {} terms, {} non-zeros", space.n_rows(), space.n_terms(), space.nnz());

    for item in corpus.items() {
        let row = space.row(item.position)?;
        let mut weights: Vec<(u32, f64)> = row.iter().collect();
        weights.sort_by(|a, b| b.1.total_cmp(&a.1));
        let terms: Vec<String> = weights
            .iter()
            .take(top)
            .map(|(t, w)| format!("{}={:.3}", space.vocabulary()[*t as usize], w))
            .collect();
        println!("{:>8}  {:<24} {}", item.id, item.title, terms.join(" "));
    }
    Ok(())
}
