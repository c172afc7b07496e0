use std::{env, fs, process};

use heterograph::{
    cli::{CommandLineConfig, handle_command},
    document::GraphDocument,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };
    let Some(path) = config.input.as_deref() else {
        eprintln!("error: --input is required");
        eprint!("{}", CommandLineConfig::help());
        process::exit(2);
    };

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("unable to read {path}: {err}");
            process::exit(2);
        }
    };
    let graph = match GraphDocument::from_json(&text).and_then(GraphDocument::into_graph) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("invalid graph document: {err}");
            process::exit(1);
        }
    };
    info!(
        command = %config.command,
        nodes = graph.total_nodes(),
        edges = graph.total_edges(),
        "running command"
    );

    match handle_command(&graph, &config.command, &config.command_args) {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {
            eprintln!("unknown command {}", config.command);
            process::exit(2);
        }
        Err(err) => {
            eprintln!("command failed: {err}");
            process::exit(1);
        }
    }
}
