use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use pdf_layout_md::cli;

fn main() -> Result<()> {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            println!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };
    if cli::dispatch(args).is_err() {
        std::process::exit(1);
    }
    Ok(())
}
