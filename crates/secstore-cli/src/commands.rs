use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::CommandFactory;
use colored::Colorize;
use secstore_client::{ClientConfig, ObjectStoreClient, Outcome, ReadOutcome, TeeDriver};

use crate::cli::*;

pub fn run_command(cli: Cli) -> ExitCode {
    let result = execute(cli);
    match &result {
        Ok(line) => println!("{line}"),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            eprintln!("{}", Cli::command().render_usage());
        }
    }
    ExitCode::from(exit_status(&result))
}

/// `OK` and `NOT_FOUND` both exit 0; fatal and truncated results exit 1.
/// Usage errors never get here: clap exits with 2 itself.
fn exit_status(result: &anyhow::Result<String>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn execute(cli: Cli) -> anyhow::Result<String> {
    let config = load_config(&cli)?;
    tracing::debug!(store_dir = %config.store_dir.display(), ta = %config.ta_uuid, "using file-backed store");
    let client = ObjectStoreClient::file_backed(&config);
    dispatch(&client, cli.command)
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(dir) = &cli.store_dir {
        config.store_dir = dir.clone();
    }
    Ok(config)
}

/// Run one command and return the line to print on success.
pub fn dispatch<D: TeeDriver>(
    client: &ObjectStoreClient<D>,
    command: Command,
) -> anyhow::Result<String> {
    match command {
        Command::Put(args) => cmd_put(client, args),
        Command::Get(args) => cmd_get(client, &args.key),
        Command::Delete(args) => cmd_delete(client, &args.key),
    }
}

fn cmd_put<D: TeeDriver>(client: &ObjectStoreClient<D>, args: PutArgs) -> anyhow::Result<String> {
    let data = match (args.data, &args.file) {
        (Some(data), _) => data.into_encoded_bytes(),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => bail!("no payload given"),
    };
    client.put(&args.key, &data)?;
    Ok("OK".into())
}

fn cmd_get<D: TeeDriver>(client: &ObjectStoreClient<D>, key: &str) -> anyhow::Result<String> {
    render_read(key, client.get(key)?)
}

fn cmd_delete<D: TeeDriver>(client: &ObjectStoreClient<D>, key: &str) -> anyhow::Result<String> {
    Ok(render_outcome(client.delete(key)?).into())
}

fn render_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "OK",
        Outcome::NotFound => "NOT_FOUND",
    }
}

/// Reads print the payload as text, up to the first NUL.
fn render_read(key: &str, outcome: ReadOutcome) -> anyhow::Result<String> {
    match outcome {
        ReadOutcome::Found(payload) => Ok(format!(
            "OK:{key}:{}",
            String::from_utf8_lossy(payload.text_bytes())
        )),
        ReadOutcome::NotFound => Ok("NOT_FOUND".into()),
        ReadOutcome::Truncated { partial, required } => bail!(
            "object '{key}' is truncated: {required} bytes stored, {} read",
            partial.len()
        ),
    }
}
