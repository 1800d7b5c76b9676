use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jsbuffer::logging::init_tracing;
use jsbuffer::{ArrayBuffer, DataView, ElementKind, NumericValue};

#[derive(Parser)]
#[command(
    name = "jsbuffer",
    version,
    about = "Decode binary data the way a JavaScript DataView would"
)]
struct Cli {
    /// File whose bytes are loaded into the buffer
    file: Option<PathBuf>,

    /// Inspect inline hex bytes (e.g. "01 02 ff") instead of a file
    #[arg(short = 'x', long = "hex", conflicts_with = "file")]
    hex: Option<String>,

    /// Element kind: int8, uint8, int16, uint16, int32, uint32, float32,
    /// float64, bigint64, biguint64
    #[arg(short, long, default_value = "uint8")]
    kind: String,

    /// Byte offset of the first element
    #[arg(short, long, default_value_t = 0)]
    offset: i64,

    /// Number of consecutive elements to print
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Decode multi-byte values as little-endian (default big-endian)
    #[arg(short, long)]
    little_endian: bool,

    /// Log buffer and view activity at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn load_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if digits.len() % 2 != 0 {
        return Err("hex input has an odd number of digits".to_string());
    }
    digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16).map_err(|_| format!("invalid hex byte '{text}'"))
        })
        .collect()
}

/// Read `count` consecutive `kind` elements starting at `offset`.
fn inspect(
    buffer: &ArrayBuffer,
    kind: ElementKind,
    offset: i64,
    count: usize,
    little_endian: bool,
) -> jsbuffer::Result<Vec<NumericValue>> {
    let view = DataView::new(buffer, 0, None)?;
    let width = kind.bytes_per_element() as i64;
    (0..count as i64)
        .map(|i| view.get(kind, offset + i * width, little_endian))
        .collect()
}

fn run(cli: &Cli) -> Result<Vec<NumericValue>, String> {
    let kind = ElementKind::from_name(&cli.kind)
        .ok_or_else(|| format!("unknown element kind '{}'", cli.kind))?;
    let bytes = match (&cli.hex, &cli.file) {
        (Some(hex), _) => parse_hex(hex)?,
        (None, Some(path)) => load_file(path)?,
        (None, None) => return Err("either a FILE or --hex is required".to_string()),
    };
    let buffer = ArrayBuffer::from_bytes(bytes);
    inspect(&buffer, kind, cli.offset, cli.count, cli.little_endian).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    match run(&cli) {
        Ok(values) => {
            for value in values {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}
