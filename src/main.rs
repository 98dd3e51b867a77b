//! SAP-1 Emulator - CLI Entry Point
//!
//! Commands:
//! - `sap1-emu asm <source> <image>` - Assemble to a binary image
//! - `sap1-emu run <image>` - Run an image until it halts
//! - `sap1-emu disasm <image>` - Disassemble an image
//! - `sap1-emu inspect <image>` - Execute a few instructions and dump state
//! - `sap1-emu debug <image>` - Interactive debugger

use clap::{Parser, Subcommand};
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sap1-emu")]
#[command(version = "0.1.0")]
#[command(about = "A cycle-accurate emulator and assembler for the SAP-1 computer")]
struct Cli {
    /// Log every clock phase to stderr
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble source to a binary image
    Asm {
        /// Path to the assembly source
        input: String,
        /// Path of the image file to write
        output: String,
    },
    /// Run an image until it halts
    Run {
        /// Path to the binary image
        image: String,
        /// Stop after this many instructions (default: run until HLT)
        #[arg(short, long)]
        max_instructions: Option<u64>,
    },
    /// Disassemble an image to readable text
    Disasm {
        /// Path to the binary image
        image: String,
    },
    /// Execute instructions without a master reset and print the machine state as JSON
    Inspect {
        /// Path to the binary image
        image: String,
        /// Number of instructions to execute
        #[arg(short, long, default_value = "0")]
        instructions: u64,
    },
    /// Interactive phase-stepping debugger
    Debug {
        /// Path to the binary image
        image: String,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Wrong argument counts print usage and exit cleanly
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::MissingRequiredArgument
                | ErrorKind::TooManyValues
                | ErrorKind::UnknownArgument
                | ErrorKind::MissingSubcommand
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => e.exit_code(),
            };
            std::process::exit(code);
        }
    };

    init_logging(cli.trace);

    match cli.command {
        Some(Commands::Asm { input, output }) => {
            assemble_file(&input, &output);
        }
        Some(Commands::Run { image, max_instructions }) => {
            run_image(&image, max_instructions);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        Some(Commands::Inspect { image, instructions }) => {
            inspect_image(&image, instructions);
        }
        Some(Commands::Debug { image }) => {
            debug_image(&image);
        }
        None => {
            println!("SAP-1 Emulator v0.1.0");
            println!("A cycle-accurate Simple-As-Possible computer");
            println!();
            println!("Use --help for available commands");
        }
    }
}

/// Logs go to stderr so OUT values on stdout stay clean.
fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("sap1=trace")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_or_exit(path: &str) -> sap1::ProgramImage {
    match sap1::load_image(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to load image {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn assemble_file(source_path: &str, out_path: &str) {
    use sap1::{assemble, save_image};

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let image = match assemble(&source) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = save_image(out_path, &image) {
        eprintln!("Failed to save image: {}", e);
        std::process::exit(1);
    }

    tracing::info!(source = source_path, output = out_path, "assembled");
}

fn run_image(path: &str, max_instructions: Option<u64>) {
    use sap1::Cpu;

    let image = load_or_exit(path);
    let mut cpu = Cpu::with_program(image.words());

    let result = match max_instructions {
        None => cpu.run(),
        Some(limit) => {
            let stdout = std::io::stdout();
            cpu.run_limited(limit, &mut stdout.lock())
        }
    };

    match result {
        Ok(executed) => {
            if !cpu.is_halted() {
                eprintln!();
                eprintln!("Stopped after {} instructions without reaching HLT", executed);
            }
        }
        Err(e) => {
            eprintln!("CPU error: {}", e);
            std::process::exit(1);
        }
    }
}

fn disassemble_file(path: &str) {
    let image = load_or_exit(path);
    print!("{}", sap1::disassemble(&image));
}

fn inspect_image(path: &str, instructions: u64) {
    use sap1::Cpu;

    let image = load_or_exit(path);
    let mut cpu = Cpu::with_program(image.words());

    for _ in 0..instructions {
        if !cpu.is_running() {
            break;
        }
        if let Err(e) = cpu.step() {
            eprintln!("CPU error: {}", e);
            std::process::exit(1);
        }
    }

    match serde_json::to_string_pretty(&cpu.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize state: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn debug_image(path: &str) {
    let image = load_or_exit(path);

    if let Err(e) = sap1::run_debugger(image) {
        eprintln!("Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_image(_path: &str) {
    eprintln!("Debugger not available: built without the `tui` feature");
    std::process::exit(1);
}
