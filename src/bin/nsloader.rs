//! Command-line front end over the nsloader library.
//!
//! Bootstraps a loader from a registration manifest (or a directory of payload
//! files), then resolves, loads, or reports on the resulting registry. Logs go
//! to stderr through `tracing`; stdout carries only command output.

use anyhow::{Context, Result, bail};
use nsloader::config::{LOG_ENV, REGISTRATIONS_ENV};
use nsloader::{FsIncluder, Loader, LoaderConfig, ResolverChain, open_source};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse(env::args_os().skip(1))?;
    init_tracing(cli.verbose);

    let config = cli.loader_config()?;
    let registrations = cli.registrations_path()?;
    let mut source = open_source(&registrations)?;
    let loader = Loader::bootstrap(source.as_mut(), config)
        .with_context(|| format!("bootstrapping from {}", registrations.display()))?;

    match cli.command {
        Command::Resolve => {
            for id in &cli.identifiers {
                match loader.resolve(id) {
                    Some(path) => println!("{}", path.display()),
                    None => println!(),
                }
            }
        }
        Command::Load => {
            let mut chain = ResolverChain::default();
            chain.register(loader.clone());
            let mut includer = FsIncluder::default();
            for id in &cli.identifiers {
                let Some(module) = chain.load(id, &mut includer)? else {
                    bail!("no resolver claimed {id}");
                };
                println!("{}\t{}\t{}", id, module.path.display(), module.source.len());
            }
        }
        Command::Diagnostics => {
            println!("{}", serde_json::to_string_pretty(loader.diagnostics())?);
        }
        Command::Mappings => {
            println!("{}", serde_json::to_string_pretty(loader.registry())?);
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Resolve,
    Load,
    Diagnostics,
    Mappings,
}

impl Command {
    fn takes_identifiers(self) -> bool {
        matches!(self, Command::Resolve | Command::Load)
    }
}

#[derive(Debug)]
struct Cli {
    command: Command,
    registrations: Option<PathBuf>,
    separator: Option<String>,
    extension: Option<String>,
    verbose: bool,
    identifiers: Vec<String>,
}

impl Cli {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();
        let Some(subcommand) = args.next() else {
            usage(1);
        };

        let command = match subcommand.to_str() {
            Some("resolve") => Command::Resolve,
            Some("load") => Command::Load,
            Some("diagnostics") => Command::Diagnostics,
            Some("mappings") => Command::Mappings,
            Some("--help") | Some("-h") => usage(0),
            Some(other) => bail!("Unknown subcommand: {other}"),
            None => bail!("Subcommand must be valid Unicode"),
        };

        let mut cli = Cli {
            command,
            registrations: None,
            separator: None,
            extension: None,
            verbose: false,
            identifiers: Vec::new(),
        };

        while let Some(arg) = args.next() {
            let arg = arg
                .into_string()
                .map_err(|raw| anyhow::anyhow!("Argument must be valid Unicode: {raw:?}"))?;
            match arg.as_str() {
                "--registrations" | "-r" => {
                    cli.registrations = Some(PathBuf::from(next_value(&mut args, &arg)?));
                }
                "--separator" => cli.separator = Some(next_value(&mut args, &arg)?),
                "--extension" => cli.extension = Some(next_value(&mut args, &arg)?),
                "--verbose" | "-v" => cli.verbose = true,
                "--help" | "-h" => usage(0),
                flag if flag.starts_with("--") => bail!("Unknown option: {flag}"),
                _ => cli.identifiers.push(arg),
            }
        }

        if command.takes_identifiers() && cli.identifiers.is_empty() {
            bail!("{} expects at least one module identifier", subcommand.to_string_lossy());
        }
        if !command.takes_identifiers() && !cli.identifiers.is_empty() {
            bail!(
                "{} does not take module identifiers",
                subcommand.to_string_lossy()
            );
        }
        Ok(cli)
    }

    fn loader_config(&self) -> Result<LoaderConfig> {
        let mut config = LoaderConfig::from_env()?;
        if let Some(sep) = &self.separator {
            config = config.with_separator(sep)?;
        }
        if let Some(ext) = &self.extension {
            config = config.with_extension(ext)?;
        }
        Ok(config)
    }

    fn registrations_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.registrations {
            return Ok(path.clone());
        }
        match env::var_os(REGISTRATIONS_ENV) {
            Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => bail!("No registrations given. Pass --registrations or set {REGISTRATIONS_ENV}."),
        }
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    let Some(value) = args.next() else {
        bail!("{flag} expects a value");
    };
    value
        .into_string()
        .map_err(|raw| anyhow::anyhow!("{flag} value must be valid Unicode: {raw:?}"))
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: nsloader <resolve|load|diagnostics|mappings> [options] [ID...]\n\n\
Commands:\n  \
  resolve ID...    Print the file each identifier maps to (blank when declined).\n  \
  load ID...       Load each identifier's file; fails if it is missing or unclaimed.\n  \
  diagnostics      Print rejected registrations and collisions as JSON.\n  \
  mappings         Print the built registry as JSON.\n\n\
Options:\n  \
  -r, --registrations PATH   Manifest file or payload directory (default: ${REGISTRATIONS_ENV}).\n  \
  --separator C              Identifier separator (default: '.').\n  \
  --extension EXT            Module file extension (default: 'mod').\n  \
  -v, --verbose              Debug logging on stderr (otherwise ${LOG_ENV}, default warn)."
    );
    std::process::exit(code);
}
