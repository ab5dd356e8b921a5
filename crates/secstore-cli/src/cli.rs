use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "secstore",
    about = "Store, read and delete small objects in trusted secure storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log backend interaction at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory of the simulated secure backend (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an object, replacing any previous one
    #[command(alias = "PUT")]
    Put(PutArgs),
    /// Print an object as OK:<key>:<payload>
    #[command(alias = "GET")]
    Get(KeyArgs),
    /// Delete an object
    #[command(alias = "DELETE")]
    Delete(KeyArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["data", "file"])))]
pub struct PutArgs {
    pub key: String,
    /// Payload given inline, taken byte for byte
    pub data: Option<OsString>,
    /// Read the payload from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}
