//! Simple command that prints one or '-n count' time-based UUID strings, or decodes one given by
//! '-d uuid'

use std::{env, io, io::Write, process::ExitCode};

enum Command {
    Generate(usize),
    Decode(String),
}

fn main() -> io::Result<ExitCode> {
    let command = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-n count | -d uuid]",
                    program.as_deref().unwrap_or("timeuuid")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    match command {
        Command::Generate(count) => {
            for _ in 0..count {
                writeln!(buf, "{}", timeuuid::now())?;
            }
        }
        Command::Decode(src) => {
            let Ok(e) = src.parse::<timeuuid::TimeUuid>() else {
                eprintln!("Error: invalid string representation: '{}'", src);
                return Ok(ExitCode::FAILURE);
            };
            let dp = e.date_precision();
            writeln!(buf, "version:    {:?}", e.as_uuid().version())?;
            writeln!(buf, "unix_ts_ms: {}", dp.unix_ts_ms)?;
            writeln!(buf, "ticks:      {}", dp.ticks)?;
            writeln!(buf, "node_id:    {:02x?}", e.node_id())?;
            writeln!(buf, "clock_id:   {:02x?}", e.clock_id())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut command = None;
    while let Some(arg) = args.next() {
        let opt = match arg.as_str() {
            "-n" => 'n',
            "-d" => 'd',
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        };
        if command.is_some() {
            return Err(format!("option '{}' conflicts with a previous option", opt));
        }
        let Some(opt_arg) = args.next() else {
            return Err(format!("argument to option '{}' missing", opt));
        };
        if opt == 'd' {
            command.replace(Command::Decode(opt_arg));
        } else {
            let Ok(c) = opt_arg.parse() else {
                return Err(format!("invalid argument to option 'n': '{}'", opt_arg));
            };
            command.replace(Command::Generate(c));
        }
    }
    Ok(command.unwrap_or(Command::Generate(1)))
}
