use std::env;
use std::fs;
use std::process::ExitCode;

use html_runs::{ConvertOptions, Document, HtmlConverter, Run, StaticHost};

#[derive(Clone, Debug)]
struct Args {
    html_path: String,
    keep_whitespace: bool,
    background: String,
    families: Vec<String>,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let html = fs::read_to_string(&cli.html_path)
        .map_err(|err| format!("read {}: {}", cli.html_path, err))?;

    let options = if cli.keep_whitespace {
        ConvertOptions::preserve_whitespace()
    } else {
        ConvertOptions::default()
    };
    let host = StaticHost::new(cli.background.clone()).with_families(cli.families.clone());
    let mut engine = HtmlConverter::with_options(options);
    let doc = engine.convert(&html, &host);
    print_document(&doc);
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }
    let html_path = args
        .get(1)
        .filter(|v| !v.starts_with("--"))
        .cloned()
        .ok_or_else(|| "missing <file.html>".to_string())?;

    let mut cfg = Args {
        html_path,
        keep_whitespace: false,
        background: "white".to_string(),
        families: Vec::new(),
    };

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--keep-whitespace" => {
                cfg.keep_whitespace = true;
                i += 1;
            }
            "--background" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--background requires a value".to_string())?;
                cfg.background = v.clone();
                i += 2;
            }
            "--font" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--font requires a value".to_string())?;
                cfg.families.push(v.clone());
                i += 2;
            }
            other => return Err(format!("unknown option: {}", other)),
        }
    }
    Ok(cfg)
}

fn print_document(doc: &Document) {
    println!("{}", doc.text());
    println!("---");
    for (idx, run) in doc.runs().iter().enumerate() {
        println!("{}", describe_run(idx, run));
    }
    for image in doc.images() {
        println!(
            "image @{} {}x{} {}",
            image.offset,
            image.width(),
            image.height(),
            image.reference
        );
    }
}

fn describe_run(idx: usize, run: &Run) -> String {
    let font = &run.style.font;
    let mut flags = Vec::new();
    if run.style.is_bold() {
        flags.push("bold");
    }
    if run.style.is_italic() {
        flags.push("italic");
    }
    if font.underline {
        flags.push("underline");
    }
    if font.overstrike {
        flags.push("overstrike");
    }
    let mut line = format!(
        "#{} [{}, {}) fg={} bg={} font=\"{}\" {} justify={:?} tabs={}",
        idx,
        run.start,
        run.end,
        run.style.foreground,
        run.style.background,
        font.family,
        font.size,
        run.style.justify,
        run.style.tabs.len()
    );
    if !flags.is_empty() {
        line.push(' ');
        line.push_str(&flags.join(","));
    }
    if let Some(link) = &run.link {
        line.push_str(" link=");
        line.push_str(link);
    }
    line
}

fn help_text() -> &'static str {
    r#"html-runs - dump the styled runs of an HTML fragment

USAGE:
  cargo run --features cli --bin html-runs -- <file.html> [options]

OPTIONS:
  --keep-whitespace           copy character data verbatim
  --background <color>        host background color (default: white)
  --font <family>             declare an installed font family (repeatable)
  -h, --help                  show this help"#
}
