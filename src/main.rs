use adocblog::build::build_site;
use adocblog::config::Config;
use adocblog::convert::Asciidoctor;
use adocblog::logging::init_logging;
use clap::Parser;
use std::path::PathBuf;

/// Builds a static blog from the AsciiDoc posts in `<root>/content` into
/// `<root>/build`.
#[derive(Parser)]
#[command(name = "adocblog", version, about)]
struct Cli {
    /// The project directory.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Log every page as it is converted.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::from_directory(&cli.root)?;
    let converter = Asciidoctor::new(&config.asciidoctor);
    let summary = build_site(&config, &converter)?;
    println!(
        "Built {} page(s) into {}",
        summary.pages,
        summary.output_directory.display()
    );
    Ok(())
}
