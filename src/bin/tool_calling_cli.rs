//! tool-calling-cli: render tool prompts and interpret raw model replies offline.
//!
//! Usage:
//!   tool-calling-cli render [--tools <file>] [--config <file>]
//!   tool-calling-cli interpret [--tools <file>] [--config <file>] [--model <name>] [--passthrough]

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tool_calling_llm::interpret::UuidCallIdGenerator;
use tool_calling_llm::{
    compose_turn, interpret_response, InterpretOptions, MissingResponsePolicy, ToolCallingConfig,
    ToolDeclaration,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "interpret" => cmd_interpret(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("tool-calling-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"tool-calling-cli: prompt-based tool calling utilities

USAGE:
    tool-calling-cli <COMMAND> [OPTIONS]

COMMANDS:
    render                  Print the system prompt for a set of tools
    interpret               Read a raw model reply on stdin, print the interpreted message
    version                 Show version information
    help                    Show this help message

OPTIONS:
    --tools <file>          JSON or YAML list of tool declarations
    --config <file>         YAML tool-calling configuration
    --model <name>          Model name reported in errors (interpret)
    --passthrough           Return raw content when a reply has no response text

ENVIRONMENT:
    RUST_LOG                        Log filter (e.g. debug)
    TOOL_CALLING_MISSING_RESPONSE   strict | passthrough
    TOOL_CALLING_TEMPLATE_PATH      System template file
    TOOL_CALLING_CALL_ID_PREFIX     Prefix for generated call ids"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn load_config(args: &[String]) -> anyhow::Result<ToolCallingConfig> {
    let config = match flag_value(args, "--config") {
        Some(path) => ToolCallingConfig::from_file(path)?,
        None => ToolCallingConfig::default(),
    };
    Ok(config.apply_env()?)
}

fn load_tools(args: &[String]) -> anyhow::Result<Vec<ToolDeclaration>> {
    let Some(path) = flag_value(args, "--tools") else {
        return Ok(Vec::new());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("cannot read tools file {path}"))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let tools = if is_json {
        serde_json::from_str(&text).with_context(|| format!("invalid tools file {path}"))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("invalid tools file {path}"))?
    };
    Ok(tools)
}

fn cmd_render(args: &[String]) -> anyhow::Result<()> {
    println!("{}", render_prompt(args)?);
    Ok(())
}

fn render_prompt(args: &[String]) -> anyhow::Result<String> {
    let config = load_config(args)?;
    let tools = load_tools(args)?;
    let turn = compose_turn(&tools, &config.system_template()?)?;
    Ok(turn.system_message.content().to_string())
}

fn cmd_interpret(args: &[String]) -> anyhow::Result<()> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("cannot read model reply from stdin")?;
    println!("{}", interpret_reply(args, &raw)?);
    Ok(())
}

fn interpret_reply(args: &[String], raw: &str) -> anyhow::Result<String> {
    let mut config = load_config(args)?;
    if args.iter().any(|a| a == "--passthrough") {
        config.missing_response = MissingResponsePolicy::PassThrough;
    }
    let tools = load_tools(args)?;
    let turn = compose_turn(&tools, &config.system_template()?)?;
    if raw.trim().is_empty() {
        bail!("empty model reply on stdin");
    }

    let options = InterpretOptions::new(flag_value(args, "--model").unwrap_or("stdin"))
        .missing_response(config.missing_response)
        .ids(Arc::new(UuidCallIdGenerator::with_prefix(
            config.call_id_prefix,
        )));
    let message = interpret_response(raw, &turn.tool_set, &options)?;
    Ok(serde_json::to_string_pretty(&message)?)
}
