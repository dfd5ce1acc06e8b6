// Kbstats CLI
// Attaches to an evdev node and captures events or queries one state bit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use kbstats_core::{capture, codes, query};
use kbstats_core::{BitState, EventDevice, EventType};

const DEV_INPUT: &str = "/dev/input";

/// Exit code reporting an asserted bit in query mode, distinct from the
/// generic failure code.
const EXIT_BIT_SET: u8 = 10;

/// Capability and event stream diagnostics for evdev input devices
#[derive(Parser, Debug)]
#[command(name = "kbstats")]
#[command(version)]
#[command(about = "Print evdev device capabilities and decoded events", long_about = None)]
struct Args {
    /// Grab the device for exclusive access while capturing
    #[arg(long)]
    grab: bool,

    /// Query the state of a single bit instead of capturing
    /// (check the exit code: 0 = clear, 10 = set, 1 = error)
    #[arg(long)]
    query: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Event device node (/dev/input/eventX); scans and prompts if omitted
    device: Option<PathBuf>,

    /// Event type to query: EV_KEY, EV_SW, EV_LED or EV_SND
    event_type: Option<String>,

    /// Key/switch/LED/sound to query, by name (e.g. KEY_A) or numeric code
    key: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("kbstats: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.query {
        run_query(&args)
    } else {
        run_capture(&args)
    }
}

fn run_capture(args: &Args) -> anyhow::Result<ExitCode> {
    let path = match &args.device {
        Some(path) => path.clone(),
        None => scan_devices()?,
    };

    let mut device = match EventDevice::open(&path) {
        Ok(device) => device,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied && !is_root() => {
            bail!(
                "you do not have access to {}, try running as root",
                path.display()
            );
        }
        Err(err) => {
            return Err(err).with_context(|| format!("opening {}", path.display()));
        }
    };

    log::debug!("capturing from {}", path.display());

    kbstats_core::print_device_info(&device)?;
    println!("Testing ... (interrupt to exit)");

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone())?;

    capture::run(&mut device, args.grab, &stop)?;
    Ok(ExitCode::SUCCESS)
}

fn run_query(args: &Args) -> anyhow::Result<ExitCode> {
    let (Some(path), Some(event_type), Some(key)) = (&args.device, &args.event_type, &args.key)
    else {
        bail!("query mode requires device, type and key parameters");
    };

    let kind = parse_query_type(event_type)?;
    let code = codes::resolve_code(kind, key)?;
    let Some(max) = kind.max_code() else {
        bail!("{kind} cannot be queried");
    };
    if code > max {
        bail!("code {code} is out of bounds for {kind} (max {max})");
    }

    log::debug!("querying {} {kind} bit {code}", path.display());

    let device =
        EventDevice::open(path).with_context(|| format!("opening {}", path.display()))?;
    match query::query(&device, kind, code)? {
        BitState::Set => Ok(ExitCode::from(EXIT_BIT_SET)),
        BitState::Clear => Ok(ExitCode::SUCCESS),
    }
}

/// Event types with a current-state request.
const QUERYABLE: &[EventType] = &[
    EventType::Key,
    EventType::Sw,
    EventType::Led,
    EventType::Snd,
];

fn parse_query_type(text: &str) -> anyhow::Result<EventType> {
    QUERYABLE
        .iter()
        .copied()
        .find(|kind| kind.name() == text)
        .with_context(|| {
            format!("unrecognised event type: {text} (expected EV_KEY, EV_SW, EV_LED or EV_SND)")
        })
}

/// List /dev/input/event* with their names on stderr and prompt for one.
fn scan_devices() -> anyhow::Result<PathBuf> {
    eprintln!("No device specified, trying to scan all of {DEV_INPUT}/event*");
    if !is_root() {
        eprintln!("Not running as root, no devices may be available.");
    }

    let mut nodes = Vec::new();
    for entry in std::fs::read_dir(DEV_INPUT)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(number) = name
            .strip_prefix("event")
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };
        nodes.push((number, entry.path()));
    }
    if nodes.is_empty() {
        bail!("no event devices found in {DEV_INPUT}");
    }
    nodes.sort();

    eprintln!("Available devices:");
    for (_, path) in &nodes {
        let label = EventDevice::open(path)
            .and_then(|device| device.name())
            .unwrap_or_else(|_| "???".to_string());
        eprintln!("{}:\t{label}", path.display());
    }

    let max_device = nodes.iter().map(|(number, _)| *number).max().unwrap_or(0);
    eprint!("Select the device event number [0-{max_device}]: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let selected: usize = line
        .trim()
        .parse()
        .with_context(|| format!("not a device number: {:?}", line.trim()))?;
    if !nodes.iter().any(|(number, _)| *number == selected) {
        bail!("no such device: {DEV_INPUT}/event{selected}");
    }

    Ok(PathBuf::from(format!("{DEV_INPUT}/event{selected}")))
}

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}
