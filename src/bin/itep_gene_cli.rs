use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use itep_gene_rs::{Config, SessionError, TerminalPresenter, Workspace};

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner
}

/// The workspace (and with it the database connection) is dropped before this returns.
fn run(config: &Config) -> Result<(), SessionError> {
    let loading = spinner("Opening gene database and alias table...");
    let workspace = match Workspace::open(config) {
        Ok(workspace) => workspace,
        Err(err) => {
            loading.finish_and_clear();
            return Err(err);
        }
    };
    loading.finish_with_message(format!(
        "Loaded {} locus tags.",
        workspace.aliases().len()
    ));

    let result = workspace.controller(TerminalPresenter::stdio()).run();
    result
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    eprintln!("WARNING! This is highly experimental and will probably break in strange and wonderful ways.");

    let config = Config::parse();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("itep-gene: {err}");
            ExitCode::FAILURE
        }
    }
}
