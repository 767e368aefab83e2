//!
//! murmur interactive client
//! -------------------------
//! Terminal front end over the same session, routing and mutation logic a
//! browser shell would use. Every command prints the resulting frame and any
//! toasts it produced.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use murmur::app::App;
use murmur::cli::{dispatch, parse_command, Command, Reply, HELP};
use murmur::config::{parse_base_url, ClientConfig};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--url <base url>] [--timeout-ms <ms>] [--path <start path>]\n\nFlags:\n  --url <url>          Backend origin (env: MURMUR_API_URL, default http://127.0.0.1:5000)\n  --timeout-ms <ms>    Per-request timeout (env: MURMUR_TIMEOUT_MS, default none)\n  --path <path>        Location to open once the session settles (default /)\n  -h, --help           Show this help\n\n{HELP}"
    );
}

fn main() -> Result<()> {
    murmur::logging::init("warn");

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut cfg = ClientConfig::from_env().context("reading MURMUR_* environment")?;
    let mut start_path = "/".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                let Some(v) = args.get(i + 1) else { eprintln!("--url requires a value"); print_usage(&program); std::process::exit(2); };
                cfg.base_url = parse_base_url(v)?;
                i += 2;
            }
            "--timeout-ms" => {
                let Some(v) = args.get(i + 1) else { eprintln!("--timeout-ms requires a value"); print_usage(&program); std::process::exit(2); };
                let ms: u64 = v.parse().with_context(|| format!("invalid --timeout-ms '{}'", v))?;
                cfg.timeout = if ms == 0 { None } else { Some(Duration::from_millis(ms)) };
                i += 2;
            }
            "--path" => {
                let Some(v) = args.get(i + 1) else { eprintln!("--path requires a value"); print_usage(&program); std::process::exit(2); };
                start_path = v.clone();
                i += 2;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let app = rt.block_on(async {
        let app = App::new(&cfg)?;
        app.start();
        Ok::<_, murmur::error::AppError>(app)
    })?;
    run_repl(&rt, &app, &start_path)
}

fn print_lines(lines: &[String]) {
    for l in lines {
        println!("{}", l);
    }
}

fn run_repl(rt: &tokio::runtime::Runtime, app: &App, start_path: &str) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;
    println!("murmur client. Type 'help' for commands.");

    let open = Command::Open { path: start_path.to_string() };
    let mut no_prompt = |_: &str| -> Option<String> { None };
    if let Reply::Lines(lines) = rt.block_on(dispatch(app, open, &mut no_prompt)) {
        print_lines(&lines);
    }

    loop {
        let line = match rl.readline("> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading input"),
        };
        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };
        // a login line may carry a password
        if !matches!(cmd, Command::Login { password: Some(_), .. }) {
            let _ = rl.add_history_entry(line.as_str());
        }

        // secrets are read without echo and never reach the editor's history
        let mut prompt = |label: &str| rpassword::prompt_password(label).ok();
        match rt.block_on(dispatch(app, cmd, &mut prompt)) {
            Reply::Lines(lines) => print_lines(&lines),
            Reply::Quit => break,
        }
    }
    Ok(())
}
