mod board;
mod interactive;
mod logging;
mod script;
mod session;
mod settings;
mod time;
mod transcript;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clock_core::config::Config;
use clock_core::menu::tree::ROOT_MENU;
use clock_core::tasks::TaskSet;
use log::{LevelFilter, warn};

use session::{Emulator, Session};
use transcript::TranscriptLogger;

const USAGE: &str = "Usage: clock-emulator [--interactive] [--log <level>] [--settings <path>] \
                     [--store <path> | --no-store] [--offline] [--transcript <path>]";

#[derive(Debug, Eq, PartialEq)]
struct Options {
    interactive: bool,
    log_level: Option<LevelFilter>,
    settings: PathBuf,
    store: Option<PathBuf>,
    online: bool,
    transcript: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interactive: false,
            log_level: None,
            settings: PathBuf::from("settings.json"),
            store: Some(PathBuf::from("time.json")),
            online: true,
            transcript: None,
        }
    }
}

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    // Log lines would tear the full-screen view, so interactive runs stay quiet
    // unless asked.
    let level = options.log_level.unwrap_or(if options.interactive {
        LevelFilter::Off
    } else {
        LevelFilter::Warn
    });
    if let Err(err) = logging::init(level) {
        eprintln!("logger unavailable: {err}");
    }

    if options.interactive && options.transcript.is_some() {
        warn!("--transcript is ignored in interactive mode");
    }

    let config = Config::resolve(settings::load(&options.settings));
    let hardware = board::hardware(options.store.clone(), options.online);
    let mut tasks = TaskSet::new(&ROOT_MENU);

    if options.interactive {
        let mut emulator = Emulator::new(&mut tasks, hardware, config)?;
        interactive::run(&mut emulator)?;
        if emulator.reset_requested() {
            println!("System reset requested.");
        }
        return Ok(());
    }

    let transcript = match &options.transcript {
        Some(path) => Some(TranscriptLogger::create(path)?),
        None => None,
    };
    let mut session = Session::new(&mut tasks, hardware, config, transcript)?;
    run_prompt(&mut session)
}

fn run_prompt(session: &mut Session<'_>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "ByteBand clock emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    while !session.is_finished() {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        let responses = session.handle_command(trimmed)?;
        for response in responses {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| format!("Expected value after {name}"))
        };

        match flag.as_str() {
            "-i" | "--interactive" => options.interactive = true,
            "--offline" => options.online = false,
            "--no-store" => options.store = None,
            "--log" => {
                let level = value("--log")?;
                options.log_level = Some(
                    level
                        .parse()
                        .map_err(|_| format!("Unknown log level `{level}`"))?,
                );
            }
            "--settings" => options.settings = PathBuf::from(value("--settings")?),
            "--store" => options.store = Some(PathBuf::from(value("--store")?)),
            "--transcript" => options.transcript = Some(PathBuf::from(value("--transcript")?)),
            other => return Err(format!("Unknown argument `{other}`")),
        }
    }

    Ok(options)
}
