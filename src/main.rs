use std::io::Read;

use clap::Parser;
use dotlang::ast::Rule;
use dotlang::{Error, StringifyOptions};

#[derive(Parser)]
#[command(name = "dotlang", about = "Parse Graphviz DOT and print it back formatted")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<std::path::PathBuf>,

    /// Spaces per nesting level
    #[arg(long, short = 'i', default_value_t = 2)]
    indent: usize,

    /// Grammar rule the input is parsed as (graph, subgraph, node, edge, attribute, attributes)
    #[arg(long, short = 'r')]
    rule: Option<Rule>,

    /// Print edges of a fragment with `--` instead of `->`
    #[arg(long)]
    undirected: bool,

    /// Print the converted graph model instead of the syntax tree
    #[arg(long, conflicts_with = "rule")]
    normalize: bool,
}

fn main() {
    env_logger::builder().format_timestamp(None).init();
    let cli = Cli::parse();

    let input = match &cli.file {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("ERROR: failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let options = StringifyOptions {
        directed: !cli.undirected,
        indent_size: cli.indent,
    };
    let result = if cli.normalize {
        dotlang::normalize(&input, &options)
    } else {
        dotlang::reformat(&input, cli.rule.unwrap_or_default(), &options)
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            if let Error::Syntax(syntax) = &e {
                eprintln!("{}", syntax.snippet(&input));
            }
            std::process::exit(1);
        }
    }
}
