use std::{fs::read_to_string, path::PathBuf, process, time::Instant};

use clap::Parser;
use tracing::info;

use weirdc::{
    ast::ast::Stmt,
    brace_checker::brace_checker,
    compile, display_diagnostic,
    errors::errors::{Error, ErrorTip, Warning},
    get_line,
    lexer::{lexer::tokenize, tokens::Token},
    parser::parser::parse,
    type_checker::type_checker::check_nodes,
    Options,
};

/// Front end of the weird compiler. Prints the checked syntax tree that a
/// C code generator would consume.
#[derive(Parser, Debug)]
#[command(name = "weirdc", version, about)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Only tokenize and print the tokens
    #[arg(long, conflicts_with_all = ["parse", "check"])]
    lex: bool,

    /// Stop after parsing and print the syntax tree
    #[arg(long, conflicts_with = "check")]
    parse: bool,

    /// Stop after checking, without reference-count lowering
    #[arg(long)]
    check: bool,

    /// Treat warnings as errors
    #[arg(long)]
    deny_warnings: bool,

    /// Don't add decref statements
    #[arg(long)]
    no_decref: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.to_string_lossy().into_owned());

    let source = match read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: cannot read '{}': {}", cli.file.display(), error);
            process::exit(1);
        }
    };

    let start = Instant::now();
    let result = if cli.lex {
        run_lexer(&source)
    } else if cli.parse {
        run_parser(&source)
    } else {
        let options = Options {
            file_name: file_name.clone(),
            deny_warnings: cli.deny_warnings,
            lower_refcounts: !cli.no_decref && !cli.check,
        };
        run_front_end(&source, &options, cli.check)
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            info!("finished in {:?}", start.elapsed());
        }
        Err(error) => {
            display_error(&error, &file_name, &source);
            process::exit(1);
        }
    }
}

fn run_lexer(source: &str) -> Result<String, Error> {
    let tokens = tokenize(source).collect::<Result<Vec<Token>, Error>>()?;
    let lines: Vec<String> = tokens
        .iter()
        .map(|token| {
            let location = token.location;
            format!("{}:{}: {}", location.line, location.start, token)
        })
        .collect();
    Ok(lines.join("\n"))
}

fn run_parser(source: &str) -> Result<String, Error> {
    let tokens = tokenize(source).collect::<Result<Vec<Token>, Error>>()?;
    brace_checker::check(&tokens)?;
    let nodes = parse(tokens.into_iter().map(Ok)).collect::<Result<Vec<Stmt>, Error>>()?;
    Ok(format!("{:#?}", nodes))
}

fn run_front_end(source: &str, options: &Options, check_only: bool) -> Result<String, Error> {
    let mut print_warning = |warning: Warning| display_warning(&warning, &options.file_name, source);

    if check_only && !options.deny_warnings {
        let tokens = tokenize(source).collect::<Result<Vec<Token>, Error>>()?;
        brace_checker::check(&tokens)?;
        let nodes = parse(tokens.into_iter().map(Ok)).collect::<Result<Vec<Stmt>, Error>>()?;
        let checked = check_nodes(&nodes, &mut print_warning)?;
        return Ok(format!("{:#?}", checked));
    }

    let nodes = compile(source, options, &mut print_warning)?;
    Ok(format!("{:#?}", nodes))
}

fn display_warning(warning: &Warning, file_name: &str, source: &str) {
    let location = warning.get_location();
    eprintln!(
        "{}",
        display_diagnostic(
            "warning",
            file_name,
            &warning.get_message(),
            Some(location),
            get_line(source, location),
        )
    );
}

fn display_error(error: &Error, file_name: &str, source: &str) {
    let line = match error.get_location() {
        Some(location) => get_line(source, location),
        None => "",
    };
    eprintln!(
        "{}",
        display_diagnostic("error", file_name, &error.message(), error.get_location(), line)
    );

    if let ErrorTip::Suggestion(tip) = error.get_tip() {
        eprintln!("  ({})", tip);
    }
}
