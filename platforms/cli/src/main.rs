use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tape_machine::programs::{PALINDROME, PALINDROME_ACCEPT};
use tape_machine::{
    Configuration, Halt, Program, ProgramLoader, ProgramManager, TuringMachine,
    TuringMachineError, DEFAULT_MAX_STEPS,
};
use tracing_subscriber::EnvFilter;

/// Runs single-tape Turing machines.
#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tape-machine palindrome radar
  tape-machine run programs/binary-increment.tur --input 111 --debug
  echo adda | tape-machine palindrome --json
  tape-machine show \"Busy Beaver (2-state)\"")]
struct Cli {
    /// Log more (-v info, -vv debug). The LOG environment variable takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program file or a built-in program
    Run {
        /// Path to a .tur file, or the name of a built-in program
        program: String,

        /// Replace the program's initial tape ('_' stands for the blank symbol)
        #[clap(short, long)]
        input: Option<String>,

        #[clap(flatten)]
        options: RunOptions,
    },
    /// Check whether a string over {a, d, r} is a palindrome
    Palindrome {
        /// The string to check, taken literally. Read from stdin when omitted.
        input: Option<String>,

        #[clap(flatten)]
        options: RunOptions,
    },
    /// List the built-in programs
    List {
        /// Only list programs whose name contains this text (case-insensitive)
        #[clap(short, long)]
        search: Option<String>,
    },
    /// Print the source of a built-in program
    Show {
        /// Name of the built-in program
        name: String,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Maximum number of steps to execute
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print a JSON report instead of text
    #[clap(long)]
    json: bool,
}

/// The result of one run, as printed by `--json`.
#[derive(Serialize)]
struct Report {
    program: String,
    initial: Configuration,
    outcome: Halt,
    steps: usize,
    max_steps: usize,
    #[serde(rename = "final")]
    final_configuration: Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    palindrome: Option<bool>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Run {
            program,
            input,
            options,
        } => {
            let program = load_program(&program)?;
            let mut machine = TuringMachine::from_program(&program);
            if let Some(input) = input {
                machine.set_tape(&input);
            }

            let report = execute(&program.name, machine, &options);
            print_report(&report, &options)?;
        }
        Command::Palindrome { input, options } => {
            let input = match input {
                Some(input) => input,
                None => read_input()?,
            };

            let machine = ProgramManager::palindrome_machine(&input)?;

            let mut report = execute(PALINDROME, machine, &options);
            let accepted = report.final_configuration.state == PALINDROME_ACCEPT;
            report.palindrome = Some(accepted);
            print_report(&report, &options)?;

            if !options.json {
                let verdict = if accepted { "is" } else { "is not" };
                println!("\n'{}' {} a palindrome.", input.trim(), verdict);
            }
        }
        Command::List { search } => {
            for index in list_indices(search.as_deref())? {
                let info = ProgramManager::get_program_info(index)?;
                println!(
                    "{}. {} (start: {}, tape: {:?}, {} states, {} rules)",
                    info.index,
                    info.name,
                    info.initial_state,
                    info.initial_tape,
                    info.state_count,
                    info.transition_count
                );
            }
        }
        Command::Show { name } => {
            print!("{}", ProgramManager::get_program_text(&name)?);
        }
    }

    Ok(())
}

/// Registry indices to list, narrowed by `search` when given.
fn list_indices(search: Option<&str>) -> Result<Vec<usize>, TuringMachineError> {
    match search {
        Some(query) => ProgramManager::search_programs(query),
        None => Ok((0..ProgramManager::get_program_count()?).collect()),
    }
}

/// Loads `source` as a program file if it exists, otherwise as a built-in program name.
fn load_program(source: &str) -> Result<Program, TuringMachineError> {
    let path = Path::new(source);

    if path.exists() {
        ProgramLoader::load_program(path)
    } else {
        ProgramManager::get_program_by_name(source)
    }
}

/// Runs the machine, printing intermediate configurations in debug mode.
fn execute(program: &str, mut machine: TuringMachine, options: &RunOptions) -> Report {
    tracing::info!(program, max_steps = options.max_steps, "running");

    let initial = machine.configuration();
    let text = !options.json;

    if text {
        println!("Initial configuration:\n{}", initial);
    }

    let outcome = if options.debug && text {
        machine.run_with(options.max_steps, |m| {
            println!("\nStep {}:\n{}", m.step_count(), m.configuration());
        })
    } else {
        machine.run(options.max_steps)
    };

    if text {
        println!("\n{}", describe(outcome, &machine, options.max_steps));
    }

    Report {
        program: program.to_string(),
        initial,
        outcome,
        steps: machine.step_count(),
        max_steps: options.max_steps,
        final_configuration: machine.configuration(),
        palindrome: None,
    }
}

fn describe(outcome: Halt, machine: &TuringMachine, max_steps: usize) -> String {
    match outcome {
        Halt::Final => format!(
            "Machine stopped in final state '{}' after {} steps.",
            machine.state(),
            machine.step_count()
        ),
        Halt::NoTransition => format!(
            "Machine halted in state '{}' after {} steps: no transition for symbol {:?}.",
            machine.state(),
            machine.step_count(),
            machine.tape().current_symbol()
        ),
        Halt::StepLimit => format!("Machine reached the maximum number of steps ({}).", max_steps),
    }
}

fn print_report(report: &Report, options: &RunOptions) -> Result<(), Box<dyn Error>> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("\nFinal configuration:\n{}", report.final_configuration);
    }

    Ok(())
}

/// Reads one line from stdin, prompting when attached to a terminal.
fn read_input() -> io::Result<String> {
    if atty::is(atty::Stream::Stdin) {
        print!("Enter a string to check for palindrome: ");
        io::stdout().flush()?;
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn init_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var("LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn level_from_verbosity(verbosity: u8) -> tracing::metadata::LevelFilter {
    match verbosity {
        0 => tracing::metadata::LevelFilter::ERROR,
        1 => tracing::metadata::LevelFilter::INFO,
        _ => tracing::metadata::LevelFilter::DEBUG,
    }
}
