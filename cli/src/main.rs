//! `jsengine-cli` — REPL, script runner and bytecode compiler for `jsengine`.

mod cli;

use std::io::Write;

use clap::Parser;
use cli::{Cli, Commands};
use jsengine::{Context, JsError, Runtime};
use log::{error, info};

fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Warn).ok();

    let args = Cli::parse();
    let runtime = Runtime::new();
    let mut cx = runtime.create_context();
    cx.set_step_limit(args.step_limit);

    let ok = match args.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(&mut cx),
        Commands::Run(a) => run_file(&mut cx, &a.file),
        Commands::Exec(a) => run_source(&mut cx, &a.source, "<exec>"),
        Commands::Qjsc(a) => run_qjsc(&mut cx, &a.input, &a.output),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// `qjs> ` prompt, one line at a time. Exits cleanly on `exit`, `quit` or
/// EOF (Ctrl-D). A thrown or syntax error is printed and the loop keeps
/// going — only an unrecoverable I/O failure reading stdin stops it.
fn run_repl(cx: &mut Context) -> bool {
    let stdin = std::io::stdin();
    loop {
        print!("qjs> ");
        if std::io::stdout().flush().is_err() {
            return true;
        }

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => return true, // EOF
            Ok(_) => {}
            Err(e) => {
                error!("failed to read stdin: {}", e);
                return false;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            return true;
        }

        match cx.eval(trimmed) {
            Ok(value) => println!("{}", value.to_js_string()),
            Err(e) => println!("Uncaught {}", describe_error(&e)),
        }
        cx.run_microtasks();
        drain_console(cx);
    }
}

fn run_file(cx: &mut Context, path: &std::path::Path) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            error!("could not read {}: {}", path.display(), e);
            return false;
        }
    };
    run_source(cx, &source, &path.to_string_lossy())
}

fn run_source(cx: &mut Context, source: &str, label: &str) -> bool {
    let result = match cx.eval(source) {
        Ok(v) => v,
        Err(e) => {
            error!("{}: {}", label, describe_error(&e));
            return false;
        }
    };
    cx.run_microtasks();
    drain_console(cx);
    if cx.has_pending_exception() {
        let exc = cx.get_pending_exception().unwrap();
        error!("{}: uncaught exception: {}", label, exc.to_js_string());
        return false;
    }
    info!("{}: {}", label, result.to_js_string());
    true
}

fn run_qjsc(cx: &mut Context, input: &std::path::Path, output: &std::path::Path) -> bool {
    let source = match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            error!("could not read {}: {}", input.display(), e);
            return false;
        }
    };
    let bytecode = match cx.compile(&source) {
        Ok(b) => b,
        Err(e) => {
            error!("{}: {}", input.display(), describe_error(&e));
            return false;
        }
    };
    if let Err(e) = std::fs::write(output, bytecode.dump()) {
        error!("could not write {}: {}", output.display(), e);
        return false;
    }
    info!("wrote {}", output.display());
    true
}

fn drain_console(cx: &mut Context) {
    for line in cx.console_output() {
        println!("{}", line);
    }
    cx.clear_console();
}

fn describe_error(e: &JsError) -> String {
    e.display()
}
