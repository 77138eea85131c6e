use anyhow::bail;
use argh::FromArgs;
use echo_script::{Config, Echo, FileWriter};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(FromArgs)]
/// run external commands and write files.
struct Cli {
    #[argh(switch, short = 'v')]
    /// print each command to stderr before running it.
    verbose: bool,

    #[argh(subcommand)]
    command: Subcommand,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Subcommand {
    Run(RunArgs),
    Write(WriteArgs),
    Append(AppendArgs),
    Repl(ReplArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
/// run a command and print its output with variables expanded.
struct RunArgs {
    #[argh(positional, greedy)]
    /// the command line; words are joined with spaces.
    command: Vec<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "write")]
/// replace the content of a file.
struct WriteArgs {
    #[argh(switch)]
    /// write each text argument as its own line.
    lines: bool,

    #[argh(positional)]
    /// target file.
    path: String,

    #[argh(positional, greedy)]
    /// text to write; joined with spaces unless --lines is given.
    text: Vec<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "append")]
/// add to the end of a file.
struct AppendArgs {
    #[argh(switch)]
    /// write each text argument as its own line.
    lines: bool,

    #[argh(positional)]
    /// target file.
    path: String,

    #[argh(positional, greedy)]
    /// text to write; joined with spaces unless --lines is given.
    text: Vec<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "repl")]
/// run commands interactively.
struct ReplArgs {}

fn main() -> anyhow::Result<()> {
    let cli: Cli = argh::from_env();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut config = Config::from_env();
    config.verbose |= cli.verbose;

    match cli.command {
        Subcommand::Run(args) => run(config, &args.command.join(" ")),
        Subcommand::Write(args) => write_file(FileWriter::write(&args.path), args.lines, &args.text),
        Subcommand::Append(args) => write_file(FileWriter::append(&args.path), args.lines, &args.text),
        Subcommand::Repl(_) => Echo::new().with_config(config).repl(),
    }
}

fn run(config: Config, command: &str) -> anyhow::Result<()> {
    let mut echo = Echo::new().with_config(config);
    echo.runout(command);
    if let Some(err) = echo.procs().last().and_then(|p| p.err()) {
        bail!("{err}");
    }
    Ok(())
}

fn write_file(mut writer: FileWriter, lines: bool, text: &[String]) -> anyhow::Result<()> {
    if lines {
        writer.lines(text);
    } else {
        writer.string(&text.join(" "));
    }
    if let Some(err) = writer.err() {
        bail!("{err}");
    }
    Ok(())
}
