use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stripforge", version)]
struct Cli {
    /// Log filter, e.g. `info` or `stripforge=debug`.
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a comic document to `{author}-{id}.png`.
    Render(RenderArgs),
    /// Print every asset key the document needs, one per line.
    Keys(KeysArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Comic document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Directory holding the downloaded assets, addressed by key.
    #[arg(long)]
    assets: PathBuf,

    /// TrueType/OpenType font used for all text.
    #[arg(long, default_value = "resources/LiberationSans-Bold.ttf")]
    font: PathBuf,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Optional render config JSON; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct KeysArgs {
    /// Comic document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Optional render config JSON (the corner tile key lives there).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Keys(args) => cmd_keys(args),
    }
}

fn read_doc_json(path: &Path) -> anyhow::Result<stripforge::ComicDocument> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: stripforge::ComicDocument =
        serde_json::from_reader(r).with_context(|| "parse document JSON")?;
    Ok(doc)
}

fn read_config(path: Option<&Path>) -> anyhow::Result<stripforge::RenderConfig> {
    match path {
        Some(p) => Ok(stripforge::RenderConfig::from_json_file(p)?),
        None => Ok(stripforge::RenderConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let mut fonts = stripforge::FontSet::load(&args.font, &config)?;

    let doc = read_doc_json(&args.doc)?;
    doc.validate()?;

    let keys = doc.required_asset_keys(&config);
    let assets = stripforge::AssetStore::load_keys(&args.assets, &keys)?;

    let rendered = stripforge::render_comic(&doc, &assets, &mut fonts, &config)?;
    for o in &rendered.overlaps {
        eprintln!(
            "warning: balloons overlap in panel {} ({}x{} px)",
            o.panel_index + 1,
            o.overlap.width,
            o.overlap.height
        );
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let path = rendered.save_png(&args.out_dir)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn cmd_keys(args: KeysArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let doc = read_doc_json(&args.doc)?;
    for key in doc.required_asset_keys(&config) {
        println!("{key}");
    }
    Ok(())
}
