//! Interactive fallback used when no subcommand is given.

use std::io::{BufRead, Write};

use anyhow::bail;
use console::Term;

use super::Commands;

pub fn prompt() -> anyhow::Result<Commands> {
    let mut term = Term::stdout();
    let stdin = std::io::stdin();
    select(&mut term, &mut stdin.lock())
}

fn select(out: &mut impl Write, input: &mut impl BufRead) -> anyhow::Result<Commands> {
    writeln!(out, "Select an option:\n\t[1] Full ASN scan\n\t[2] Specific IPv4 range scan")?;

    match read_answer(input)?.as_str() {
        "1" => {
            write!(out, "Please input the host name: ")?;
            out.flush()?;
            Ok(Commands::Asn {
                hostname: read_answer(input)?,
            })
        }
        "2" => {
            write!(out, "Please input the ip range (like 104.36.195.0/24): ")?;
            out.flush()?;
            Ok(Commands::Range {
                cidr: read_answer(input)?,
            })
        }
        other => bail!("Unknown option: \"{other}\"."),
    }
}

fn read_answer(input: &mut impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before an answer was given");
    }
    Ok(line.trim().to_string())
}
