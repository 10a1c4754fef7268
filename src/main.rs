use anyhow::{Context, Result};
use ariel_lib::environment::Environment;
use ariel_lib::interpreter::Interpreter;
use ariel_lib::{builtins, lexer, parser, run_source};
use clap::Parser as clapParser;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HELP: &str = "Enter Ariel statements, e.g. `int x = 2; println(x * 21);`.\n\
Declarations persist for the whole session. Type `exit` or `quit` to leave.";

/// Runs an Ariel program, or starts an interactive session.
#[derive(clapParser)]
#[command(version)]
struct Args {
    /// Path to an Ariel source file
    file_path: Option<PathBuf>,

    /// Start the interactive prompt, after running FILE if one is given
    #[arg(long)]
    repl: bool,

    /// Log interpreter events to stderr
    #[arg(long)]
    debug: bool,
}

// RUST_LOG takes precedence over --debug.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_file(file_path: PathBuf, env: &mut Environment, interpreter: &mut Interpreter) -> Result<()> {
    let tokens = lexer::tokenize_file(file_path.clone())
        .with_context(|| format!("failed to load {}", file_path.display()))?;
    let program = parser::parse(tokens)?;
    debug!(statements = program.statements.len(), "parsed program");

    // Only failures are reported; output comes from println/print.
    if let Some(result) = interpreter.run(&program, env) {
        if result.is_error() {
            println!("{}", result);
        }
    }

    Ok(())
}

fn repl(env: &mut Environment, interpreter: &mut Interpreter) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("ariel".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        let line = match line_editor.read_line(&prompt)? {
            Signal::Success(line) => line,
            Signal::CtrlC | Signal::CtrlD => break,
        };

        match line.trim() {
            "" => continue,
            "help" => {
                println!("{}", HELP);
                println!("Builtins: {}", builtins::names().collect::<Vec<_>>().join(", "));
            }
            "exit" | "quit" => break,
            source => match run_source(source, env, interpreter) {
                Ok(Some(value)) => println!("{}", value),
                Ok(None) => {}
                Err(error) => println!("{}", error),
            },
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Args = Args::parse();
    init_logging(args.debug);

    let mut stdout = io::stdout();
    let mut interpreter = Interpreter::new(&mut stdout);
    let mut env = Environment::new();

    let interactive = args.repl || args.file_path.is_none();
    if let Some(file_path) = args.file_path {
        run_file(file_path, &mut env, &mut interpreter)?;
    }
    if interactive {
        repl(&mut env, &mut interpreter)?;
    }

    Ok(())
}
