use std::io::{Write, stdin, stdout};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, bail, ensure},
};
use dreambrush::{backend::WebUi, config::Config, llm::Gemini, pipeline, synth::Profile};

#[derive(Debug, clap::Parser)]
struct Cli {
    /// Prompt profile
    #[arg(short, long, value_enum, default_value_t = ProfileArg::V2)]
    profile: ProfileArg,

    /// Where run output directories are created (default: ./generated)
    #[arg(short, long)]
    output_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ProfileArg {
    V1,
    V2,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    color_eyre::install()?;

    let args = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(root) = args.output_root {
        config.output_root = root;
    }
    let profile = match args.profile {
        ProfileArg::V1 => Profile::v1(),
        ProfileArg::V2 => Profile::v2(),
    };

    let idea = read_line("Prompt > ")?;
    let idea = idea.trim();
    if idea.is_empty() {
        bail!("the prompt must not be empty");
    }
    let batch_size = parse_batch_size(&read_line("Batch Size(Default to 1) > ")?)?;

    println!("Please stand by...Generating prompt.");

    let llm = Gemini::new(config.gemini_api_key.clone(), profile.model);
    let backend = WebUi::new(&config.sd_host, config.sd_port);
    let paths = pipeline::run(
        &llm,
        &backend,
        &profile,
        idea,
        batch_size,
        &config.output_root,
    )
    .await?;

    println!("Saved {} image(s)", paths.len());
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush()?;
    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line)
}

fn parse_batch_size(input: &str) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(1);
    }
    let batch_size: u32 = input.parse().context("batch size must be a number")?;
    ensure!(batch_size > 0, "batch size must be at least 1");
    Ok(batch_size)
}
