//! memio CLI tool
//!
//! Peek and poke values at physical addresses.

use std::process;

use memio::{Config, MemIo, TypedValue, Width};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("memio");

    if args.len() < 2 {
        print_usage(program);
        return Ok(());
    }

    match args[1].as_str() {
        "read" => cmd_read(&args[2..])?,
        "write" => cmd_write(&args[2..])?,
        "help" | "--help" | "-h" => print_usage(program),
        "version" | "--version" | "-V" => print_version(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(program);
            process::exit(1);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!(
        r#"memio - Physical memory peek/poke

USAGE:
    {} <COMMAND> [OPTIONS]

COMMANDS:
    read    Read a value at a physical address
    write   Write a value to a physical address
    help    Show this help message
    version Show version information

OPTIONS:
    --width <N>         Access width in bytes: 1, 2, 4 or 8 (default: 4)
    --device <PATH>     Device file (default: $MEMIO_DEVICE or /dev/mem)

EXAMPLES:
    {} read 0xfed40000
    {} write 0x1000000 42 --width 8
"#,
        program, program, program
    );
}

fn print_version() {
    println!("memio {}", env!("CARGO_PKG_VERSION"));
}

/// Options shared by `read` and `write`.
struct Options {
    positional: Vec<String>,
    width: Width,
    config: Config,
}

fn parse_options(args: &[String]) -> Result<Options, Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut width = Width::Four;
    let mut config = Config::from_env();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--width" | "-w" => {
                i += 1;
                let value = args.get(i).ok_or("--width requires a value")?;
                width = Width::from_bytes(value.parse()?)?;
            }
            "--device" | "-d" => {
                i += 1;
                let value = args.get(i).ok_or("--device requires a path")?;
                config.device_path = value.into();
            }
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg).into());
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    Ok(Options {
        positional,
        width,
        config,
    })
}

/// Parse a `0x`-prefixed hex or decimal number.
fn parse_number(s: &str) -> Result<u64, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    }
}

fn cmd_read(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let opts = parse_options(args)?;
    let [addr] = opts.positional.as_slice() else {
        return Err("usage: memio read <ADDR> [--width N] [--device PATH]".into());
    };
    let addr = parse_number(addr)?;

    let mem = MemIo::builder().config(opts.config).build()?;
    let value = mem.read_width(addr, opts.width)?;

    println!("{:#0digits$x}", value, digits = opts.width.bytes() * 2 + 2);
    Ok(())
}

fn cmd_write(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let opts = parse_options(args)?;
    let [addr, value] = opts.positional.as_slice() else {
        return Err("usage: memio write <ADDR> <VALUE> [--width N] [--device PATH]".into());
    };
    let addr = parse_number(addr)?;
    let value = TypedValue::from_u64(opts.width, parse_number(value)?)?;

    let mem = MemIo::builder().config(opts.config).build()?;
    mem.write(addr, &value)?;
    Ok(())
}
