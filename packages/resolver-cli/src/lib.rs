#![deny(clippy::all)]

//! Submodule Aliases CLI
//!
//! Command-line front end for inspecting alias resolution in a workspace.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::{Path, PathBuf};

use submodule_aliases::check::{check_files, collect_source_files, scan_extensions};
use submodule_aliases::config::CONFIG_FILE_NAME;
use submodule_aliases::{
    AliasOptions, AliasResolver, DiscoveryMode, NodeFileSystem, Resolution, ResolutionRequest,
};

pub fn build_command() -> Command {
    Command::new("submodule-aliases")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve @/ and @submodule import aliases in a nested package workspace")
        .subcommand_required(true)
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Workspace root (defaults to the current directory)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help(format!("Path to the options file (defaults to <root>/{})", CONFIG_FILE_NAME))
                .global(true),
        )
        .arg(
            Arg::new("packages-dir")
                .long("packages-dir")
                .value_name("NAME")
                .help("Name of the directory holding submodules")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print machine-readable JSON")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log output (-v debug, -vv trace)")
                .global(true),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve one specifier as seen from an importing file")
                .arg(Arg::new("specifier").required(true).value_name("SPECIFIER"))
                .arg(
                    Arg::new("from")
                        .short('f')
                        .long("from")
                        .required(true)
                        .value_name("IMPORTER")
                        .help("File containing the import"),
                ),
        )
        .subcommand(Command::new("list").about("List discovered submodules"))
        .subcommand(
            Command::new("check")
                .about("Scan sources for alias imports and report the ones that do not resolve")
                .arg(
                    Arg::new("dir")
                        .value_name("DIR")
                        .help("Directory to scan (defaults to the root)"),
                ),
        )
}

/// Log level implied by the number of `-v` flags.
pub fn log_level(matches: &ArgMatches) -> &'static str {
    match matches.get_count("verbose") {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Build resolver options from the config file and command-line overrides.
pub fn load_options(matches: &ArgMatches) -> Result<AliasOptions> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let root = matches
        .get_one::<String>("root")
        .map(|r| cwd.join(r))
        .unwrap_or_else(|| cwd.clone());

    let mut options = match matches.get_one::<String>("config") {
        Some(path) => {
            let path = cwd.join(path);
            AliasOptions::load(&path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => AliasOptions::load_from_root(&root)?,
    };

    // An explicit --root beats the file; a root from the file is relative to the workspace.
    if matches.get_one::<String>("root").is_some() || options.root.is_none() {
        options.root = Some(root.to_string_lossy().to_string());
    } else if let Some(from_file) = options.root.take() {
        options.root = Some(root.join(from_file).to_string_lossy().to_string());
    }
    if let Some(dir) = matches.get_one::<String>("packages-dir") {
        options.packages_dir = dir.clone();
    }
    Ok(options)
}

/// Run the parsed command, writing results to `out`. Returns the process exit code.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<i32> {
    let mut options = load_options(matches)?;
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("resolve", sub)) => {
            let resolver = AliasResolver::new(NodeFileSystem::new(), options)?;
            let specifier = sub
                .get_one::<String>("specifier")
                .context("missing specifier")?;
            let importer = sub.get_one::<String>("from").context("missing importer")?;
            run_resolve(&resolver, specifier, importer, json, out)
        }
        Some(("list", _)) => {
            let resolver = AliasResolver::new(NodeFileSystem::new(), options)?;
            run_list(&resolver, json, out)
        }
        Some(("check", sub)) => {
            // One scan sees one snapshot of the workspace.
            options.discovery = DiscoveryMode::Cached;
            let resolver = AliasResolver::new(NodeFileSystem::new(), options)?;
            let dir = match sub.get_one::<String>("dir") {
                Some(dir) => std::env::current_dir()?.join(dir),
                None => PathBuf::from(resolver.root().as_str()),
            };
            run_check(&resolver, &dir, json, out)
        }
        _ => {
            build_command().print_help()?;
            Ok(2)
        }
    }
}

fn run_resolve(
    resolver: &AliasResolver<NodeFileSystem>,
    specifier: &str,
    importer: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<i32> {
    let resolution = resolver.resolve(&ResolutionRequest::new(specifier, importer));

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&resolution)?)?;
    } else if let Some(path) = resolution.path() {
        writeln!(out, "{}", path)?;
    }

    match resolution {
        Resolution::Resolved(_) => Ok(0),
        Resolution::NotApplicable => {
            eprintln!(
                "`{}` is not handled by {} (not a workspace alias, or {} is outside every package)",
                specifier,
                resolver.name(),
                importer
            );
            Ok(1)
        }
        Resolution::NotFound => {
            eprintln!("Could not resolve `{}` from {}", specifier, importer);
            Ok(1)
        }
    }
}

fn run_list(
    resolver: &AliasResolver<NodeFileSystem>,
    json: bool,
    out: &mut dyn Write,
) -> Result<i32> {
    let registry = resolver.registry();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&*registry)?)?;
        return Ok(0);
    }

    if registry.is_empty() {
        log::info!("No submodules found under {}", resolver.root());
    }
    for record in registry.iter() {
        writeln!(out, "{}\t{}\t{}", record.name, record.depth, record.root_path)?;
    }
    Ok(0)
}

fn run_check(
    resolver: &AliasResolver<NodeFileSystem>,
    dir: &Path,
    json: bool,
    out: &mut dyn Write,
) -> Result<i32> {
    let files = collect_source_files(dir, &scan_extensions(resolver.options()))?;
    log::info!("Scanning {} files under {}", files.len(), dir.display());
    let report = check_files(resolver, &files);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for (file, import) in report.not_found() {
            writeln!(out, "{}:{}: cannot resolve `{}`", file, import.line, import.specifier)?;
        }
        for (file, message) in &report.unreadable {
            writeln!(out, "{}: unreadable: {}", file, message)?;
        }
        let failures = report.not_found().count();
        writeln!(
            out,
            "Checked {} alias imports in {} files, {} unresolved",
            report.import_count(),
            report.files_scanned,
            failures
        )?;
    }

    Ok(if report.has_failures() { 1 } else { 0 })
}
