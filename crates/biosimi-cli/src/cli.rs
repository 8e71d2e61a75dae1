use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "BioSIMI-rs Developers",
    version,
    about = "BioSIMI CLI - compose independently authored biochemical reaction models into a single consistent model.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge subsystems, collapsing the designated shared resources.
    Share(ComposeArgs),
    /// Share, drop duplicate reactions and optionally merge every species by name.
    Combine(ComposeArgs),
    /// Combine, then merge species across declared connections.
    Connect(ComposeArgs),
    /// Print a summary of a model document.
    Inspect(InspectArgs),
    /// Rename identifiers, species names or compartments of a model document.
    Rename(RenameArgs),
    /// Convert a model document to another schema level and version.
    Convert(ConvertArgs),
    /// Change species amounts and reaction flags of a model document.
    Edit(EditArgs),
    /// Replace fast reactions by their simulated end state.
    Reduce(ReduceArgs),
}

/// Amount reconciliation policy for collapsed species.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    Volume,
    Virtual,
}

/// Arguments shared by the `share`, `combine` and `connect` subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ComposeArgs {
    /// Path to a composition file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model documents to compose, in addition to those listed in the composition file.
    #[arg(short, long = "input", value_name = "PATH", num_args(1..))]
    pub inputs: Vec<PathBuf>,

    /// Path for the composed model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the amount reconciliation policy.
    #[arg(short, long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Override the size of the composed compartment.
    #[arg(short, long, value_name = "FLOAT")]
    pub target_size: Option<f64>,

    /// Species names shared by every subsystem. Can be used multiple times.
    #[arg(short, long = "shared", value_name = "NAME")]
    pub shared: Vec<String>,

    /// Do not merge species by name after removing duplicate reactions.
    #[arg(long)]
    pub no_combine_by_name: bool,

    /// Connect two species names. Can be used multiple times. Example: --connect IPTG=IPTG_ext
    #[arg(long = "connect", value_name = "NAME=CONNECTED")]
    pub connections: Vec<String>,

    /// Set a specific configuration value, overriding the composition file.
    /// Can be used multiple times. Example: -S policy=volume
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the model document.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// List every declared identifier as well.
    #[arg(long)]
    pub identifiers: bool,
}

/// Arguments for the `rename` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RenameArgs {
    /// Path to the model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the edited model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Rename an identifier and every reference to it. Can be used multiple times.
    #[arg(long = "sid", value_name = "OLD=NEW")]
    pub sids: Vec<String>,

    /// Give species displayed as OLD the name NEW. Can be used multiple times.
    #[arg(long = "species", value_name = "OLD=NEW")]
    pub species: Vec<String>,

    /// Append `_SUFFIX` to every identifier.
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// New compartment identifiers, in declaration order.
    #[arg(long = "compartment", value_name = "ID")]
    pub compartments: Vec<String>,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the converted model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Target schema as LEVEL.VERSION (e.g., '2.4'). Defaults to the latest supported schema.
    #[arg(short, long, value_name = "LEVEL.VERSION")]
    pub schema: Option<String>,
}

/// Arguments for the `edit` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Path to the model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the edited model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Set the initial amount of species displayed as NAME. Can be used multiple times.
    #[arg(long = "amount", value_name = "NAME=FLOAT")]
    pub amounts: Vec<String>,

    /// Mark reactions as fast, by 0-based position.
    #[arg(long, value_name = "INDEX", value_delimiter = ',')]
    pub fast: Vec<usize>,

    /// Make reactions reversible, by 0-based position.
    #[arg(long, value_name = "INDEX", value_delimiter = ',')]
    pub reversible: Vec<usize>,

    /// Make reactions irreversible, by 0-based position.
    #[arg(long, value_name = "INDEX", value_delimiter = ',', conflicts_with = "reversible")]
    pub irreversible: Vec<usize>,

    /// Replacement rate laws for the reactions given to --reversible or --irreversible, in order.
    #[arg(long = "rate", value_name = "FORMULA")]
    pub rates: Vec<String>,
}

/// Arguments for the `reduce` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReduceArgs {
    /// Path to the model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the reduced model document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// CSV trajectory of the fast reactions, replayed instead of integrating.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Time points to sample. Defaults to the time column of the trajectory.
    #[arg(long, value_name = "FLOAT", value_delimiter = ',')]
    pub timepoints: Vec<f64>,
}
