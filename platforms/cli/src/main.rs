mod render;

use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{self, Clear, ClearType},
};
use log::{debug, info};
use render::{Renderer, TextRenderer};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;
use tmi::{Machine, Mode, ProgramLoader, ProgramManager, Step, TransitionTable};

/// Cells drawn when neither `--width` nor the terminal size is known.
const DEFAULT_WIDTH: usize = 21;

/// Runs single-tape Turing machine programs.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmi-cli --list
  tmi-cli 0 --tape 1011
  tmi-cli programs/palindrome.tm --tape 10101 --quiet
  echo 111 | tmi-cli --dir programs 4 --json")]
struct Cli {
    /// Program to run: an index from --list, or a path to a .tm file.
    /// Prompted for on an interactive terminal when omitted.
    program: Option<String>,

    /// Initial tape contents. Prompted for, or read from stdin, when omitted.
    #[clap(short, long)]
    tape: Option<String>,

    /// List the available programs and exit.
    #[clap(short, long)]
    list: bool,

    /// Directory of .tm programs to use instead of the built-in ones.
    #[clap(short, long)]
    dir: Option<PathBuf>,

    /// Pause between cycles, in milliseconds.
    #[clap(long, default_value_t = 0)]
    delay_ms: u64,

    /// Print only the result.
    #[clap(short, long)]
    quiet: bool,

    /// Give up after this many cycles.
    #[clap(short, long)]
    max_cycles: Option<usize>,

    /// Reject programs that define the same rule twice.
    #[clap(long)]
    strict: bool,

    /// Print the result as JSON.
    #[clap(long)]
    json: bool,

    /// Number of tape cells to draw. Defaults to what fits in the terminal.
    #[clap(short, long)]
    width: Option<usize>,
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if cli.list {
        if let Err(e) = list_programs(&cli) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return;
    }

    let result = run(&cli);
    match &result {
        Ok(Step::Halt(_)) => {}
        Ok(Step::Continue) => {
            eprintln!("Stopped: no halting state reached within the cycle limit");
        }
        Err(e) => eprintln!("Error: {}", e),
    }

    process::exit(exit_code(&result));
}

/// Maps the outcome of a run to the process exit code.
///
/// 0 when the machine halted, 1 on any error, 2 when the cycle limit stopped it.
fn exit_code<E>(result: &Result<Step, E>) -> i32 {
    match result {
        Ok(Step::Halt(_)) => 0,
        Ok(Step::Continue) => 2,
        Err(_) => 1,
    }
}

fn run(cli: &Cli) -> Result<Step, Box<dyn Error>> {
    let mode = if cli.strict { Mode::Strict } else { Mode::Normal };
    let program = match &cli.program {
        Some(program) => program.clone(),
        None => prompt_program(cli)?.to_string(),
    };
    let table = load_table(cli, &program, mode)?;
    let tape = match &cli.tape {
        Some(tape) => tape.clone(),
        None => prompt_tape()?,
    };

    let mut machine = Machine::with_mode(mode);
    machine.load_table(table)?;
    machine.load_tape(tape.as_str())?;

    // Frames replace each other on a terminal and stack up anywhere else
    let redraw = !cli.quiet && atty::is(atty::Stream::Stdout);
    if redraw {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    }

    let diagnostics = machine.diagnostics();
    if !cli.quiet {
        for diagnostic in &diagnostics {
            eprintln!("warning: {}", diagnostic);
        }
    }

    let columns = terminal::size().ok().map(|(columns, _)| columns);
    let renderer = select_renderer(cli.width, columns);
    let top = u16::try_from(diagnostics.len()).unwrap_or(u16::MAX);
    let delay = Duration::from_millis(cli.delay_ms);
    let show = |machine: &Machine| {
        if cli.quiet {
            return;
        }

        let frame = renderer.render(&machine.snapshot());
        if redraw {
            let cleared = execute!(io::stdout(), MoveTo(0, top), Clear(ClearType::FromCursorDown));
            if let Err(e) = cleared {
                debug!("Failed to redraw: {}", e);
            }
            println!("{}", frame);
        } else {
            println!("{}\n", frame);
        }
    };

    show(&machine);
    let step = machine.run_with(cli.max_cycles, |machine| {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        show(machine);
    })?;

    if let Step::Halt(_) = step {
        let outcome = machine.result()?;
        info!("Halted after {} cycles", machine.cycle_count());

        if cli.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!("{}: {}", outcome.verdict, outcome.tape);
        }
    }

    Ok(step)
}

/// Prints the programs `PROGRAM` can refer to by index.
fn list_programs(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match &cli.dir {
        Some(dir) => {
            for (index, path) in ProgramLoader::list_programs(dir)?.iter().enumerate() {
                println!("{:>3}: {}", index, path.display());
            }
        }
        None => {
            for index in 0..ProgramManager::count() {
                let info = ProgramManager::get_program_info(index)?;
                println!(
                    "{:>3}: {} ({} states, {} rules, try --tape '{}')",
                    info.index, info.name, info.state_count, info.rule_count, info.sample_tape
                );
            }
        }
    }

    Ok(())
}

/// Picks the renderer width: `--width` first, then the terminal, then the default.
fn select_renderer(width: Option<usize>, columns: Option<u16>) -> TextRenderer {
    match (width, columns) {
        (Some(width), _) => TextRenderer::new(width),
        (None, Some(columns)) => TextRenderer::fit(columns),
        (None, None) => TextRenderer::new(DEFAULT_WIDTH),
    }
}

/// Number of programs `PROGRAM` can index into.
fn program_count(cli: &Cli) -> Result<usize, Box<dyn Error>> {
    match &cli.dir {
        Some(dir) => Ok(ProgramLoader::list_programs(dir)?.len()),
        None => Ok(ProgramManager::count()),
    }
}

/// Lists the programs and asks for an index on an interactive terminal.
fn prompt_program(cli: &Cli) -> Result<usize, Box<dyn Error>> {
    if atty::isnt(atty::Stream::Stdin) {
        return Err("no program given, use --list to see the available programs".into());
    }

    list_programs(cli)?;
    select_program(io::stdin().lock(), program_count(cli)?)
}

/// Reads lines until one holds a valid program index.
fn select_program(mut reader: impl BufRead, count: usize) -> Result<usize, Box<dyn Error>> {
    if count == 0 {
        return Err("no programs available".into());
    }

    loop {
        print!("Select program [0-{}]: ", count - 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err("no program selected".into());
        }

        match line.trim().parse::<usize>() {
            Ok(index) if index < count => return Ok(index),
            _ => eprintln!("Invalid selection '{}'", line.trim()),
        }
    }
}

/// Loads the table named by `program`, either an index or a file path.
fn load_table(cli: &Cli, program: &str, mode: Mode) -> Result<TransitionTable, Box<dyn Error>> {
    let Ok(index) = program.parse::<usize>() else {
        debug!("Loading program from {}", program);
        return Ok(ProgramLoader::load_program(Path::new(program), mode)?);
    };

    match &cli.dir {
        Some(dir) => {
            let paths = ProgramLoader::list_programs(dir)?;
            let path = paths
                .get(index)
                .ok_or_else(|| format!("no program with index {} in {}", index, dir.display()))?;
            debug!("Loading program {} from {}", index, path.display());
            Ok(ProgramLoader::load_program(path, mode)?)
        }
        None => {
            let program = ProgramManager::get_program_by_index(index)?;
            debug!("Using built-in program {}", program.name);
            Ok(tmi::parse(program.source, mode)?)
        }
    }
}

/// Asks for the tape on an interactive terminal, otherwise reads it from stdin.
fn prompt_tape() -> Result<String, Box<dyn Error>> {
    if atty::is(atty::Stream::Stdin) {
        print!("Enter tape: ");
        io::stdout().flush()?;
    }

    read_tape_line(io::stdin().lock())
}

/// Reads one line, dropping only the line terminator since spaces are blanks.
fn read_tape_line(mut reader: impl BufRead) -> Result<String, Box<dyn Error>> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
