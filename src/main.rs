use std::io::{Read, Write};
use std::{env, fs, io};

use anyhow::{anyhow, bail, Context, Result};
use ariadne::{Color, Label, Report, ReportKind, Source};

use watling::{decode, encode, parse, print_module, validate_module};
use watling::{Features, Module, ParseError};

const USAGE: &str = "\
Usage: watling <command> [arguments]

  parse <file> [--wat] [-o <out>]       read text or binary, write the
                                        canonical binary (--wat: write the
                                        round-tripped text instead)
  print <file> [-o <out>]               read a module, write it as text
  validate <file> [--features=<list>]   check the module; <list> is a
                                        comma-separated set of flags or `all`
  help                                  show this message

A <file> of - reads stdin; without -o, output goes to stdout.
";

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("parse") => cmd_parse(&args[1..]),
        Some("print") => cmd_print(&args[1..]),
        Some("validate") => cmd_validate(&args[1..]),
        Some("help") | Some("--help") | Some("-h") | None => {
            print!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("unknown command `{other}`, try `watling help`"),
    }
}

fn cmd_parse(args: &[String]) -> Result<()> {
    let mut input = None;
    let mut output = None;
    let mut wat = false;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--wat" => wat = true,
            "-o" => output = Some(next(&mut args, "-o")?),
            _ if input.is_none() => input = Some(arg.clone()),
            _ => bail!("unexpected argument `{arg}`"),
        }
    }
    let path = input.ok_or_else(|| anyhow!("parse needs an input file"))?;
    let module = load_module(&path)?;
    if wat {
        write_output(output.as_deref(), print_module(&module).as_bytes())
    } else {
        write_output(output.as_deref(), &encode(&module))
    }
}

fn cmd_print(args: &[String]) -> Result<()> {
    let mut input = None;
    let mut output = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => output = Some(next(&mut args, "-o")?),
            _ if input.is_none() => input = Some(arg.clone()),
            _ => bail!("unexpected argument `{arg}`"),
        }
    }
    let path = input.ok_or_else(|| anyhow!("print needs an input file"))?;
    let module = load_module(&path)?;
    write_output(output.as_deref(), print_module(&module).as_bytes())
}

fn cmd_validate(args: &[String]) -> Result<()> {
    let mut input = None;
    let mut features = Features::none();
    for arg in args {
        if let Some(list) = arg.strip_prefix("--features=") {
            features = feature_set(list)?;
        } else if input.is_none() {
            input = Some(arg.clone());
        } else {
            bail!("unexpected argument `{arg}`");
        }
    }
    let path = input.ok_or_else(|| anyhow!("validate needs an input file"))?;
    let module = load_module(&path)?;
    match validate_module(&module, &features) {
        Ok(()) => Ok(()),
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}");
            }
            bail!("{path} does not validate");
        }
    }
}

fn feature_set(list: &str) -> Result<Features> {
    if list == "all" {
        return Ok(Features::all());
    }
    let mut features = Features::none();
    for name in list.split(',').filter(|name| !name.is_empty()) {
        match features.flag(name) {
            Some(flag) => *flag = true,
            None => bail!("unknown feature `{name}`"),
        }
    }
    Ok(features)
}

/// Reads a module in either form: buffers with the `\0asm` magic are
/// decoded, everything else is parsed as text.
fn load_module(path: &str) -> Result<Module> {
    let bytes = read_input(path)?;
    if bytes.starts_with(b"\0asm") {
        return decode(&bytes).with_context(|| format!("could not decode {path}"));
    }
    let src = std::str::from_utf8(&bytes)
        .with_context(|| format!("{path} is neither a binary module nor UTF-8 text"))?;
    match parse(src) {
        Ok(module) => Ok(module),
        Err(error) => {
            report(path, src, &error)?;
            bail!("could not parse {path}")
        }
    }
}

fn report(path: &str, src: &str, error: &ParseError) -> Result<()> {
    let span = error.span.0.min(src.len())..error.span.1.min(src.len());
    Report::build(ReportKind::Error, path, span.start)
        .with_message(&error.msg)
        .with_label(
            Label::new((path, span))
                .with_message(&error.msg)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((path, Source::from(src)))?;
    Ok(())
}

fn next(args: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String> {
    args.next()
        .cloned()
        .ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("could not read stdin")?;
        return Ok(bytes);
    }
    fs::read(path).with_context(|| format!("could not read {path}"))
}

fn write_output(path: Option<&str>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) if path != "-" => {
            fs::write(path, bytes).with_context(|| format!("could not write {path}"))
        }
        _ => io::stdout()
            .write_all(bytes)
            .context("could not write stdout"),
    }
}
