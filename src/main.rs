// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, create an API client, dispatch one
//   operation. Returns `anyhow::Result` so transport failures surface as
//   process errors.
// - Exactly one of --parameter / --list / --paste runs per invocation,
//   checked in that order; with no action flag the program exits quietly.

use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use sticky_cli::api::StickyClient;
use sticky_cli::ui::{self, PasteOptions};

#[derive(Parser)]
#[command(name = "sticky", about = "Client for a Sticky Notes paste service", version)]
struct Cli {
    /// Base site url (e.g http://server.org)
    #[arg(long)]
    site: String,

    /// List available values for a given parameter
    #[arg(long, value_enum, value_name = "NAME")]
    parameter: Option<Parameter>,

    /// List all pastes
    #[arg(long)]
    list: bool,

    /// Paste the contents of a file
    #[arg(long, value_name = "FILE")]
    paste: Option<PathBuf>,

    /// Set the title option in the paste request
    #[arg(long)]
    title: Option<String>,

    /// Set the language option in the paste request
    #[arg(long)]
    language: Option<String>,

    /// Set the password option in the paste request
    #[arg(long)]
    password: Option<String>,

    /// Set the expire option in the paste request, in minutes (0 or less
    /// means never expire)
    #[arg(long, value_name = "MINUTES")]
    expire: Option<i64>,

    /// Set the project option in the paste request
    #[arg(long)]
    project: Option<String>,

    /// Make the paste private
    #[arg(long)]
    private: bool,
}

/// Service parameters whose valid values can be listed.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Parameter {
    Expire,
    Language,
    Version,
    Theme,
}

impl Parameter {
    fn as_str(self) -> &'static str {
        match self {
            Parameter::Expire => "expire",
            Parameter::Language => "language",
            Parameter::Version => "version",
            Parameter::Theme => "theme",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let sticky = StickyClient::new(&cli.site)?;
    let mut out = io::stdout().lock();

    if let Some(parameter) = cli.parameter {
        ui::parameter_values(&sticky, parameter.as_str(), &mut out)?;
    } else if cli.list {
        ui::list_pastes(&sticky, &mut out)?;
    } else if let Some(file) = cli.paste {
        let opts = PasteOptions {
            title: cli.title,
            language: cli.language,
            password: cli.password,
            private: cli.private,
            expire_minutes: cli.expire,
            project: cli.project,
        };
        ui::create_paste(&sticky, &file, &opts, &mut out)?;
    }
    Ok(())
}
