use std::path::PathBuf;

use clap::Parser;

use replish::{MemorySource, Repl, ReplOptions, RustylineSource, StdinSource};

#[derive(Parser)]
#[command(name = "replish")]
#[command(about = "A shell-flavored interactive command interpreter")]
#[command(version)]
struct Cli {
    /// Evaluate the given commands and exit
    #[arg(short = 'c')]
    commands: Option<String>,

    /// Application name (controls the prompt and dotfile names)
    #[arg(long = "name", default_value = "repl")]
    name: String,

    /// Trace each command to stderr as it runs
    #[arg(long = "echo")]
    echo: bool,

    /// Propagate evaluation errors instead of recovering
    #[arg(long = "debug")]
    debug: bool,

    /// Module to enable (repeatable)
    #[arg(long = "module", short = 'm')]
    modules: Vec<String>,

    /// Don't register the builtin commands
    #[arg(long = "noinit")]
    noinit: bool,

    /// Don't source the startup dotfile
    #[arg(long = "nodotfile")]
    nodotfile: bool,

    /// Don't load or persist configuration variables
    #[arg(long = "noenv")]
    noenv: bool,

    /// Dotfile prefix (defaults to the application name)
    #[arg(long = "dotfile-prefix")]
    dotfile_prefix: Option<String>,

    /// Directory holding the dotfiles (defaults to the working directory)
    #[arg(long = "dotfile-root")]
    dotfile_root: Option<PathBuf>,

    /// Maximum history entries kept by the line editor
    #[arg(long = "history-length", default_value_t = 1000)]
    history_length: usize,

    /// Script file to evaluate instead of running interactively
    #[arg()]
    script_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let run_script = cli.commands.is_some() || cli.script_file.is_some();
    let input: Box<dyn replish::LineSource> = if let Some(ref commands) = cli.commands {
        Box::new(MemorySource::new(commands.lines().map(str::to_string)))
    } else if cli.script_file.is_some() {
        // the file is sourced below; nothing comes from the line source
        Box::new(MemorySource::new(Vec::<String>::new()))
    } else {
        match RustylineSource::new(cli.history_length) {
            Ok(editor) => Box::new(editor),
            Err(_) => Box::new(StdinSource::new()),
        }
    };

    let mut repl = Repl::new(ReplOptions {
        application_name: cli.name,
        dotfile_prefix: cli.dotfile_prefix,
        dotfile_root: cli.dotfile_root,
        history_length: cli.history_length,
        echo: cli.echo,
        modules_enabled: cli.modules,
        debug: cli.debug,
        noinit: cli.noinit,
        nodotfile: cli.nodotfile || run_script,
        noenv: cli.noenv || run_script,
        input: Some(input),
        ..Default::default()
    });

    if let Some(script_file) = cli.script_file {
        match repl.source(&script_file, false) {
            Ok(status) => std::process::exit(status),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = repl.run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    std::process::exit(repl.get("?").parse().unwrap_or(0));
}
