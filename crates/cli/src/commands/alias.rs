//! alias command - Register the endpoints `rm` talks to
//!
//! An alias only carries what a removal needs: the endpoint and its keys, how
//! buckets are addressed, and an optional retry budget that overrides the one
//! in `config.toml`.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use ossadm_core::{Alias, AliasManager, Error, Result, RetryBuilder};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add an alias, or replace one with the same name
    Set(SetArgs),

    /// Forget an alias
    Remove(RemoveArgs),
}

/// How bucket names are placed in request URLs
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BucketLookup {
    #[default]
    Auto,
    Path,
    Dns,
}

impl BucketLookup {
    fn as_str(self) -> &'static str {
        match self {
            BucketLookup::Auto => "auto",
            BucketLookup::Path => "path",
            BucketLookup::Dns => "dns",
        }
    }
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// First segment of ALIAS/BUCKET[/KEY] targets
    pub name: String,

    /// http(s) URL of the storage service
    pub endpoint: String,

    pub access_key: String,

    pub secret_key: String,

    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    #[arg(long, value_enum, default_value_t = BucketLookup::Auto)]
    pub bucket_lookup: BucketLookup,

    /// Attempts per remote call for removals through this alias, including the first
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub retry_times: Option<u32>,
}

impl SetArgs {
    fn into_alias(self) -> Result<Alias> {
        if self.name.is_empty() || self.name.contains('/') {
            return Err(Error::Argument(format!(
                "Invalid alias name '{}': it must be non-empty and contain no '/'",
                self.name
            )));
        }

        let mut alias = Alias::new(self.name, self.endpoint, self.access_key, self.secret_key);
        alias.region = self.region;
        alias.bucket_lookup = self.bucket_lookup.as_str().to_string();
        alias.retry = self
            .retry_times
            .map(|n| RetryBuilder::new().max_attempts(n).build());
        Ok(alias)
    }
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

/// JSON result of `alias set` and `alias remove`
#[derive(Debug, Serialize)]
struct AliasChange<'a> {
    alias: &'a str,
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_attempts: Option<u32>,
}

pub fn execute(cmd: AliasCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let result = AliasManager::new().and_then(|manager| match cmd {
        AliasCommands::Set(args) => set(args, &manager, &formatter),
        AliasCommands::Remove(args) => remove(&args.name, &manager, &formatter),
    });

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn set(args: SetArgs, manager: &AliasManager, formatter: &Formatter) -> Result<()> {
    let alias = args.into_alias()?;
    let name = alias.name.clone();
    let max_attempts = alias.retry.map(|r| r.max_attempts);

    manager.set(alias)?;
    tracing::debug!(alias = %name, path = %manager.path().display(), "Stored alias");

    report(
        formatter,
        &AliasChange {
            alias: &name,
            action: "set",
            max_attempts,
        },
    );
    Ok(())
}

fn remove(name: &str, manager: &AliasManager, formatter: &Formatter) -> Result<()> {
    manager.remove(name)?;
    report(
        formatter,
        &AliasChange {
            alias: name,
            action: "removed",
            max_attempts: None,
        },
    );
    Ok(())
}

fn report(formatter: &Formatter, change: &AliasChange<'_>) {
    if formatter.is_json() {
        formatter.json(change);
        return;
    }

    let name = formatter.style_name(change.alias);
    match change.max_attempts {
        Some(n) => formatter.success(&format!(
            "Alias '{name}' {} ({} attempts per call).",
            change.action,
            formatter.style_count(u64::from(n))
        )),
        None => formatter.success(&format!("Alias '{name}' {}.", change.action)),
    }
}
