#[macro_use]
extern crate clap;
use crossbeam_channel::{bounded, Receiver}; // Inter-thread communication
use log::{error, info, warn};
use std::path::Path;

mod dump;
mod loader;

use loader::{Image, LoadError};
use mix_core::cpu::{Cpu, State};
use mix_core::memory::Memory;

// Instructions executed between checks for Ctrl-C
const BATCH_STEPS: usize = 10_000;
const DEFAULT_MAX_STEPS: usize = 1_000_000;

mod exit_code {
    pub const HALTED: i32 = 0;
    pub const FAULTED: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const OUT_OF_STEPS: i32 = 3;
    pub const INTERRUPTED: i32 = 130;
}

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::App<'a, 'a> {
    let description = "Interpreter for Knuth's MIX machine";
    let mut app = clap::App::new("MIX interpreter")
        .version("0.1")
        .about(description)
        .setting(clap::AppSettings::SubcommandRequiredElseHelp)
        .arg(
            clap::Arg::with_name("max-steps")
                .long("max-steps")
                .value_name("N")
                .help("Stop after N instructions")
                .default_value("1000000")
                .validator(|v| v.parse::<usize>().map(|_| ()).map_err(|e| e.to_string())),
        )
        .arg(
            clap::Arg::with_name("dump")
                .long("dump")
                .value_name("START:COUNT")
                .help("Print COUNT memory locations from START after the run")
                .validator(|v| dump::parse_range(&v).map(|_| ())),
        )
        .subcommand(
            clap::SubCommand::with_name("run")
                .about("Load a memory image and execute from location 0")
                .arg(clap::Arg::with_name("IMAGE").required(true).index(1)),
        );

    for program in mix_programs::PROGRAMS.iter() {
        app = app.subcommand(clap::SubCommand::with_name(program.name).about(program.about));
    }
    app
}

/// Step budget and dump range. The validators already accepted both values.
fn run_options(matches: &clap::ArgMatches) -> (usize, Option<(usize, usize)>) {
    let max_steps = value_t!(matches, "max-steps", usize).unwrap_or(DEFAULT_MAX_STEPS);
    let dump_range = matches
        .value_of("dump")
        .and_then(|range| dump::parse_range(range).ok());
    (max_steps, dump_range)
}

/// Image selected by the subcommand
fn select_image(matches: &clap::ArgMatches) -> Result<Image, LoadError> {
    match matches.subcommand() {
        ("run", Some(args)) => {
            let path = args.value_of("IMAGE").unwrap_or_default();
            info!("Loading image {}", path);
            Image::from_file(Path::new(path))
        }
        (name, _) => {
            let cells = mix_programs::PROGRAMS
                .iter()
                .find(|program| program.name == name)
                .map_or(&[][..], |program| program.image);
            Ok(Image::from_cells(cells))
        }
    }
}

/// Runs in batches until the machine stops, the budget is spent or Ctrl-C
/// arrives. Returns the exit code.
fn execute(cpu: &mut Cpu, max_steps: usize, interrupt: &Receiver<()>) -> i32 {
    loop {
        if !interrupt.is_empty() {
            warn!("Interrupted at {} after {} instructions", cpu.pc, cpu.executed());
            return exit_code::INTERRUPTED;
        }

        let remaining = max_steps.saturating_sub(cpu.executed());
        if remaining == 0 {
            warn!("Step budget of {} exhausted at {}", max_steps, cpu.pc);
            return exit_code::OUT_OF_STEPS;
        }

        match cpu.run_for(remaining.min(BATCH_STEPS)) {
            Ok(State::Running) => continue,
            Ok(_) => {
                info!("Halted at {} after {} instructions", cpu.pc, cpu.executed());
                return exit_code::HALTED;
            }
            Err(fault) => {
                error!("{}", fault);
                for inst in cpu.history() {
                    error!("  {:04}: {}", inst.pc, dump::Octal(inst.word));
                }
                return exit_code::FAULTED;
            }
        }
    }
}

/// Main entry point for the MIX interpreter
fn main() {
    env_logger::init();

    // Set up Ctrl-C handler with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(exit_code::INTERRUPTED); // Second Ctrl-C
        }
        let _send_result = signal_sender.send(());
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        std::process::exit(exit_code::USAGE);
    }

    // Parse command-line arguments
    let cli_matches = match get_cli_config().get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => match e.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                std::process::exit(exit_code::USAGE);
            }
        },
    };

    let (max_steps, dump_range) = run_options(&cli_matches);

    let mut memory = Memory::new();
    let loaded = select_image(&cli_matches).and_then(|image| {
        info!("Loaded {} words", image.len());
        image.load_into(&mut memory)
    });
    if let Err(e) = loaded {
        error!("{}", e);
        std::process::exit(exit_code::USAGE);
    }

    let mut cpu = Cpu::new(memory);
    let code = execute(&mut cpu, max_steps, &signal_receiver);

    for line in dump::register_lines(&cpu.regs) {
        println!("{}", line);
    }
    if let Some((start, count)) = dump_range {
        for line in dump::memory_lines(cpu.memory(), start, count) {
            println!("{}", line);
        }
    }

    std::process::exit(code);
}
