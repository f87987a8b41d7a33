use clap::Parser;
use filter_targets::TargetKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ftargets",
    about = "Print the hosts and services an assign filter selects by name",
    version
)]
pub struct Cli {
    /// Filter expression, e.g. 'host.name == "web1" && service.name == "http"'
    pub filter: String,

    /// Require a by-name filter of this kind (host or service)
    #[arg(short, long)]
    pub kind: Option<TargetKind>,

    /// Define a string constant the filter may reference
    #[arg(short = 'c', long = "const", value_name = "NAME=VALUE")]
    pub defines: Vec<String>,

    /// Load constants from a JSON object file
    #[arg(short = 'C', long = "constants", value_name = "FILE")]
    pub constants_file: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
