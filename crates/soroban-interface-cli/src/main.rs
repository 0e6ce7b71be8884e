use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use serde_json::json;
use soroban_interface_core::config::DEFAULT_CONFIG_FILE;
use soroban_interface_core::{
    ContractInterface, Extraction, InterfaceConfig, InterfaceExtractor, InvocationRequest,
    InvocationValidator, InvokeArgument, Network, ValidationError, VariantKind, Visibility,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "soroban-interface")]
#[command(about = "Extract Soroban contract interfaces and validate invocations", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the interface from `stellar contract info interface` output
    Extract {
        /// Interface dump, directory of dumps, or `-` for stdin
        path: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: String,

        /// File extension of dumps when walking a directory
        #[arg(long, default_value = "txt")]
        ext: String,
    },

    /// Validate invocation arguments against a contract interface
    Validate {
        /// Interface dump, or an extracted interface as `.json`
        #[arg(long)]
        interface: String,

        /// Method to invoke
        #[arg(long)]
        method: String,

        /// JSON array of arguments, or `@<file>` to read it from a file
        #[arg(long)]
        args: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Validate a serialized invocation request
    CheckRequest {
        /// Request JSON file, or `-` for stdin
        path: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Show the network an RPC URL points at
    Network {
        /// RPC URL
        #[arg(env = "SOROBAN_RPC_URL")]
        url: String,
    },

    /// Write a default config file
    InitConfig {
        /// Where to write the config
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soroban_interface=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = InterfaceConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Extract { path, format, ext } => {
            extract_command(&config, &path, &format, &ext)?;
        }
        Commands::Validate {
            interface,
            method,
            args,
            format,
        } => {
            validate_command(&config, &interface, &method, &args, &format)?;
        }
        Commands::CheckRequest { path, format } => {
            check_request_command(&config, &path, &format)?;
        }
        Commands::Network { url } => {
            network_command(&url);
        }
        Commands::InitConfig { path } => {
            init_config_command(&path)?;
        }
    }

    Ok(())
}

fn extract_command(config: &InterfaceConfig, path: &str, format: &str, ext: &str) -> Result<()> {
    let extractor = InterfaceExtractor::with_options(config.extractor.clone());
    let path_obj = PathBuf::from(path);

    let extractions: Vec<(String, Extraction)> = if path_obj.is_dir() {
        let files: Vec<PathBuf> = WalkDir::new(&path_obj)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map_or(false, |x| x == ext))
            .map(|e| e.into_path())
            .collect();
        info!(files = files.len(), dir = %path, "extracting interfaces");

        files
            .par_iter()
            .map(|file| {
                let source = read_source(file)?;
                Ok((file.display().to_string(), extractor.extract(&source)))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let source = read_input(path)?;
        vec![(path.to_string(), extractor.extract(&source))]
    };

    if format == "json" {
        let output: Vec<_> = extractions
            .iter()
            .map(|(source, extraction)| {
                json!({
                    "source": source,
                    "interface": extraction.interface,
                    "skipped": extraction.skipped,
                })
            })
            .collect();
        if path_obj.is_dir() {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&output[0])?);
        }
    } else {
        for (source, extraction) in &extractions {
            output_interface(source, extraction);
        }
    }

    Ok(())
}

fn validate_command(
    config: &InterfaceConfig,
    interface_path: &str,
    method_name: &str,
    raw_args: &str,
    format: &str,
) -> Result<()> {
    let interface = load_interface(config, interface_path)?;
    let method = interface
        .find_method(method_name)
        .ok_or_else(|| anyhow!("Method {} not found in contract {}", method_name, interface.name))?;

    let args = parse_args(raw_args)?;
    debug!(method = %method.name, args = args.len(), "validating invocation");

    let validator = InvocationValidator::with_options(&interface.structs, config.validation.clone());
    let violations = validator.validate(method, Some(args.as_slice()));

    report_violations(&method.name, violations.as_deref(), format)
}

fn check_request_command(config: &InterfaceConfig, path: &str, format: &str) -> Result<()> {
    let content = read_input(path)?;
    let request: InvocationRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse invocation request: {}", path))?;

    let validator = InvocationValidator::with_options(&request.structs, config.validation.clone());
    let violations = validator.validate(&request.method, request.args.as_deref());

    report_violations(&request.method.name, violations.as_deref(), format)
}

fn network_command(url: &str) {
    let network = Network::from_rpc_url(url);
    println!("{} {}", "Network:".bold(), network.to_string().cyan());
    println!("{} {}", "Passphrase:".bold(), network.passphrase());
}

fn init_config_command(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        bail!("Config file already exists: {}", path);
    }
    InterfaceConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write config file: {}", path))?;
    println!("✅ Wrote default config to {}", path);
    Ok(())
}

/// `.json` files hold an already extracted interface; anything else is a raw dump
fn load_interface(config: &InterfaceConfig, path: &str) -> Result<ContractInterface> {
    let content = read_input(path)?;
    if path.ends_with(".json") {
        return serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse interface JSON: {}", path));
    }

    let extraction = InterfaceExtractor::with_options(config.extractor.clone()).extract(&content);
    for skipped in &extraction.skipped {
        eprintln!(
            "{} {} block at line {}: {}",
            "[SKIPPED]".yellow(),
            skipped.kind,
            skipped.line,
            skipped.reason
        );
    }
    Ok(extraction.interface)
}

fn parse_args(raw: &str) -> Result<Vec<InvokeArgument>> {
    let content = match raw.strip_prefix('@') {
        Some(file) => read_input(file)?,
        None => raw.to_string(),
    };
    serde_json::from_str(&content).context("Failed to parse arguments as a JSON array")
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        read_source(Path::new(path))
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn report_violations(method: &str, violations: Option<&[ValidationError]>, format: &str) -> Result<()> {
    if format == "json" {
        let output = json!({
            "method": method,
            "valid": violations.is_none(),
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output_violations(method, violations);
    }

    // Exit code: 1 if the invocation must not proceed
    if violations.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn output_violations(method: &str, violations: Option<&[ValidationError]>) {
    let Some(violations) = violations else {
        println!("{}", format!("Arguments for {} are valid.", method).green().bold());
        return;
    };

    for violation in violations {
        println!(
            "{} {} [{}]",
            "[INVALID]".red().bold(),
            violation.kind,
            violation.context()
        );
        println!("  → {}", violation.message);
        println!();
    }

    println!(
        "{}",
        format!(
            "Found {} {} for {}",
            violations.len(),
            if violations.len() == 1 { "violation" } else { "violations" },
            method
        )
        .red()
        .bold()
    );
}

fn output_interface(source: &str, extraction: &Extraction) {
    let interface = &extraction.interface;
    println!("{} {}", interface.name.bold(), format!("({})", source).dimmed());

    if !interface.methods.is_empty() {
        println!("\n  {}", "Methods:".cyan());
        for method in &interface.methods {
            let params: Vec<String> = method
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.param_type))
                .collect();
            println!(
                "    fn {}({}) -> {}",
                method.name,
                params.join(", "),
                method.return_type
            );
        }
    }

    if !interface.structs.is_empty() {
        println!("\n  {}", "Structs:".cyan());
        for item in &interface.structs {
            println!("    struct {}", item.name);
            for field in &item.fields {
                let vis = match field.visibility {
                    Visibility::Public => "pub ",
                    Visibility::Private => "",
                };
                println!("      {}{}: {}", vis, field.name, field.field_type);
            }
        }
    }

    if !interface.enums.is_empty() {
        println!("\n  {}", "Enums:".cyan());
        for item in &interface.enums {
            let marker = if item.is_error { " [error]".red().to_string() } else { String::new() };
            println!("    enum {}{}", item.name, marker);
            for variant in &item.variants {
                match &variant.kind {
                    VariantKind::Unit => println!("      {}", variant.name),
                    VariantKind::Discriminant { value } => {
                        println!("      {} = {}", variant.name, value)
                    }
                    VariantKind::Payload { data_type } => {
                        println!("      {}({})", variant.name, data_type)
                    }
                }
            }
        }
    }

    for skipped in &extraction.skipped {
        println!(
            "\n  {} {} block at line {}: {}",
            "[SKIPPED]".yellow(),
            skipped.kind,
            skipped.line,
            skipped.reason
        );
    }

    println!(
        "\n{}\n",
        format!(
            "{} methods, {} structs, {} enums",
            interface.methods.len(),
            interface.structs.len(),
            interface.enums.len()
        )
        .green()
    );
}
