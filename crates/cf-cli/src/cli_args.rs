use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cf-cli")]
#[command(about = "Campaign flow script checker and navigator")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Validate(ValidateArgs),
    Normalize(NormalizeArgs),
    Simulate(SimulateArgs),
    Navigate(NavigateArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "scripts_dir"])))]
pub(crate) struct ValidateArgs {
    #[arg(long = "file")]
    pub(crate) file: Option<String>,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct NormalizeArgs {
    #[arg(long = "file")]
    pub(crate) file: String,
    #[arg(long = "out")]
    pub(crate) out: Option<String>,
    #[arg(long = "seed")]
    pub(crate) seed: Option<u32>,
}

#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    #[arg(long = "file")]
    pub(crate) file: String,
    #[arg(long = "target", default_value = "")]
    pub(crate) target: String,
    #[arg(long = "roster")]
    pub(crate) roster: Option<String>,
    #[arg(long = "walk")]
    pub(crate) walk: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct NavigateArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    /// Block ids to zoom into, in order.
    #[arg(long = "path", value_delimiter = ',')]
    pub(crate) path: Vec<String>,
}
