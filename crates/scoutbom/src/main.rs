use clap::Parser;
use scoutbom::cli::{Cli, Commands};
use scoutbom::{scan, summary};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let json = args.json;
            let outcome = scan::run(&args)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.inventory)?);
            } else {
                summary::print(&outcome);
            }
        }
    }

    Ok(())
}
