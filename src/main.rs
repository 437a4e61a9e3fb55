use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use lemmacloud::config::CONFIG;
use lemmacloud::crawler::HttpFetcher;
use lemmacloud::data_models::ResultCount;
use lemmacloud::lexicon::{DomainExclusions, StopWords};
use lemmacloud::morphology::OpenCorporaDictionary;
use lemmacloud::notice::Notifier;
use lemmacloud::pipeline::Pipeline;
use lemmacloud::search::DuckDuckGoProvider;
use lemmacloud::style::{CloudSpec, CloudStyle, ColorStyle, Font, MaskShape, NamedPalette};

const DEFAULT_QUERY: &str = "поездки на новогодних каникулах по России в 2025";

/// Word cloud terms for a web search query.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// What to search for
    #[arg(default_value = DEFAULT_QUERY)]
    query: String,

    /// How many search results to fetch; more is slower but less noisy
    #[arg(short, long, default_value_t = 5, value_parser = parse_result_count)]
    num_results: u32,

    /// Extra lemma to leave out of the cloud (repeatable)
    #[arg(long = "exclude", value_name = "LEMMA")]
    exclude: Vec<String>,

    /// Do not apply the built-in list of irrelevant lemmas
    #[arg(long)]
    no_default_exclusions: bool,

    /// Extra stop-word (repeatable)
    #[arg(long = "stop-word", value_name = "WORD")]
    stop_words: Vec<String>,

    /// Cloud background color
    #[arg(long, default_value = lemmacloud::style::DEFAULT_BACKGROUND)]
    background: String,

    /// Paint every word with this color instead of a palette
    #[arg(long, value_name = "COLOR", conflicts_with = "palette")]
    color: Option<String>,

    #[arg(long, value_enum, default_value_t = NamedPalette::Pastel)]
    palette: NamedPalette,

    #[arg(long, value_enum, default_value_t = Font::Roboto)]
    font: Font,

    #[arg(long, value_enum, default_value_t = MaskShape::Rectangle)]
    mask: MaskShape,

    /// Where fonts/ and masks/ live (defaults to ASSETS_DIR)
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Print the renderer input as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_result_count(raw: &str) -> Result<u32, String> {
    let value: u32 = raw.parse().map_err(|e| format!("{e}"))?;
    ResultCount::new(value)
        .map(|_| value)
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = &*CONFIG;
    let num_results = ResultCount::new(args.num_results)?;

    let mut morph = OpenCorporaDictionary::load(&config.morph_dict_path)
        .context("set MORPH_DICT_PATH to an unpacked dict.opcorpora.txt")?;
    if let Some(path) = &config.morph_links_path {
        morph = morph.load_links(path)?;
    }

    let mut exclusions = if args.no_default_exclusions {
        DomainExclusions::empty()
    } else {
        DomainExclusions::curated()
    };
    if let Some(path) = &config.exclusions_path {
        exclusions = exclusions.with_file(path)?;
    }
    let exclusions = exclusions.with_extra(&args.exclude);
    let stop_words = StopWords::russian().with_extra(&args.stop_words);

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let notifier = Notifier::new(notice_tx);
    let notice_printer = tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            eprintln!("! {notice}");
        }
    });

    let pipeline = Pipeline::new(
        Box::new(DuckDuckGoProvider::from_config(config)?),
        Box::new(HttpFetcher::from_config(config)?),
        Arc::new(morph),
        stop_words,
        exclusions,
    )
    .with_notifier(notifier.clone());

    let top = pipeline.process_query(&args.query, num_results).await;

    if args.json {
        let style = CloudStyle {
            background: args.background,
            color: match args.color {
                Some(color) => ColorStyle::Single(color),
                None => ColorStyle::palette(args.palette),
            },
            font: args.font,
            mask: args.mask,
            ..CloudStyle::default()
        };
        let assets_dir = args.assets_dir.unwrap_or_else(|| config.assets_dir.clone());
        let spec = CloudSpec::build(&top, &style, &assets_dir, &notifier);
        println!("{}", serde_json::to_string_pretty(&spec)?);
    } else if top.is_empty() {
        println!("no words to show for {:?}", args.query);
    } else {
        for (rank, (term, count)) in top.as_pairs().into_iter().enumerate() {
            println!("{:>3}. {:<24} {}", rank + 1, term, count);
        }
    }

    drop(pipeline);
    drop(notifier);
    notice_printer.await?;
    Ok(())
}
