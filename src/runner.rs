use crate::command::{Hook, VarResolver, WordSplitter};
use crate::config::Config;
use crate::env::Environment;
use crate::error::ProcError;
use crate::expand::expand;
use crate::lexer::ShellWords;
use crate::proc::Proc;
use regex::Regex;
use std::io::{self, PipeReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;
use tracing::{debug, error, warn};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapses every whitespace run (newlines and tabs included) into a single
/// space and trims both ends, so multi-line command strings run as one line.
pub fn normalize(command: &str) -> String {
    WHITESPACE.replace_all(command.trim(), " ").into_owned()
}

/// Runs external commands and keeps a record of every one of them.
///
/// Each call to [`Echo::run_proc`] or [`Echo::start_proc`] appends exactly one
/// [`Proc`] to the process table, whether the command started or not.
/// Failures never abort the runner; they are stored on the `Proc` and, for
/// [`Echo::run`], reported through the optional log and panic hooks.
///
/// Example
/// ```no_run
/// use echo_script::Echo;
/// let mut echo = Echo::new();
/// echo.set_var("NAME", "world");
/// assert_eq!(echo.run("echo hello $NAME"), "hello world\n");
/// assert_eq!(echo.procs().len(), 1);
/// ```
pub struct Echo {
    env: Environment,
    procs: Vec<Proc>,
    splitter: Box<dyn WordSplitter>,
    resolver: Option<Box<dyn VarResolver>>,
    log_hook: Option<Hook>,
    panic_hook: Option<Hook>,
    verbose: bool,
}

impl Echo {
    /// A runner over a snapshot of the current process environment, with the
    /// default word splitter and no hooks.
    pub fn new() -> Self {
        Self::with_env(Environment::new())
    }

    /// A runner using `env` as its variable table.
    pub fn with_env(env: Environment) -> Self {
        Self {
            env,
            procs: Vec::new(),
            splitter: Box::new(ShellWords),
            resolver: None,
            log_hook: None,
            panic_hook: None,
            verbose: false,
        }
    }

    /// Applies `config`.
    ///
    /// Verbose mode prints each command to stderr as `+ <command>`, and the
    /// error of a failed [`Echo::run`] as plain text. It works alongside a
    /// log hook. Fail-fast installs a panic hook that exits the process.
    pub fn with_config(mut self, config: Config) -> Self {
        self.verbose = config.verbose;
        if config.fail_fast {
            self.panic_hook = Some(Box::new(|msg: &str| {
                error!(error = msg, "command failed, exiting");
                std::process::exit(1);
            }));
        }
        self
    }

    /// Hook that receives every normalized command before it starts, and the
    /// error text of a failed [`Echo::run`].
    pub fn with_log_hook(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.log_hook = Some(Box::new(hook));
        self
    }

    /// Hook that receives the error text of a failed [`Echo::run`].
    pub fn with_panic_hook(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.panic_hook = Some(Box::new(hook));
        self
    }

    /// Replaces the default shell-style word splitter.
    pub fn with_splitter(mut self, splitter: impl WordSplitter + 'static) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    /// Replaces the variable table as the source of substitution values.
    ///
    /// The table is still what child processes see as their environment.
    pub fn with_resolver(mut self, resolver: impl VarResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// The variable table and working directory.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Mutable access to the variable table.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Sets a variable for substitution and for child environments.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.env.set_var(key, val);
    }

    /// Removes a variable from the table, returning its old value.
    pub fn unset_var(&mut self, key: &str) -> Option<String> {
        self.env.unset_var(key)
    }

    /// Working directory for every later command.
    pub fn set_current_dir(&mut self, dir: impl Into<PathBuf>) {
        self.env.current_dir = dir.into();
    }

    /// Substitution value of `name`.
    pub fn val(&self, name: &str) -> String {
        match &self.resolver {
            Some(resolver) => resolver.resolve(name),
            None => self.env.resolve(name),
        }
    }

    /// Expands `$NAME` and `${NAME}` references in `text`.
    pub fn eval(&self, text: &str) -> String {
        expand(text, |name| self.val(name))
    }

    /// Every process this runner has produced, in start order.
    pub fn procs(&self) -> &[Proc] {
        &self.procs
    }

    /// Mutable access to an earlier process, e.g. to wait on it later.
    pub fn proc_mut(&mut self, index: usize) -> Option<&mut Proc> {
        self.procs.get_mut(index)
    }

    /// Runs `cmd` and blocks until it exits.
    pub fn run_proc(&mut self, cmd: &str) -> &Proc {
        let proc = self.start_proc(cmd);
        proc.wait();
        proc
    }

    /// Starts `cmd` and returns without waiting.
    ///
    /// Output and exit status stay empty until [`Proc::wait`] is called.
    pub fn start_proc(&mut self, cmd: &str) -> &mut Proc {
        let command = normalize(cmd);
        self.should_log(&command);

        let proc = self.spawn(command);
        if let Some(error) = proc.err() {
            warn!(command = %proc.command(), %error, "command did not start");
        }
        self.procs.push(proc);
        let index = self.procs.len() - 1;
        &mut self.procs[index]
    }

    /// Runs `cmd` and returns its output with variable references expanded.
    ///
    /// On failure the log and panic hooks receive the error text and the
    /// result is an empty string.
    pub fn run(&mut self, cmd: &str) -> String {
        let (failure, data) = {
            let proc = self.run_proc(cmd);
            (proc.err().map(ToString::to_string), proc.result())
        };

        if let Some(message) = failure {
            self.should_log_error(&message);
            self.should_panic(&message);
            return String::new();
        }

        self.eval(&data)
    }

    /// Runs `cmd` and prints the result to stdout.
    pub fn runout(&mut self, cmd: &str) {
        let mut stdout = io::stdout();
        if let Err(err) = self.runout_to(cmd, &mut stdout) {
            debug!(%err, "cannot write command output to stdout");
        }
    }

    /// Runs `cmd` and writes the result to `out`.
    pub fn runout_to(&mut self, cmd: &str, out: &mut dyn Write) -> io::Result<()> {
        let result = self.run(cmd);
        out.write_all(result.as_bytes())?;
        out.flush()
    }

    fn spawn(&self, command: String) -> Proc {
        let expanded = self.eval(&command);
        let words = match self.splitter.split(&expanded) {
            Ok(words) => words,
            Err(source) => {
                let error = ProcError::Split {
                    command: expanded,
                    source,
                };
                return Proc::failed(command, error);
            }
        };

        let Some((program, args)) = words.split_first() else {
            return Proc::failed(command, ProcError::EmptyCommand);
        };

        match self.spawn_child(program, args) {
            Ok((child, reader)) => {
                debug!(pid = child.id(), command = %command, "process started");
                Proc::started(command, child, reader)
            }
            Err(source) => {
                let error = ProcError::Start {
                    program: program.clone(),
                    source,
                };
                Proc::failed(command, error)
            }
        }
    }

    /// Spawns `program` with stdout and stderr sharing one pipe.
    fn spawn_child(&self, program: &str, args: &[String]) -> io::Result<(Child, PipeReader)> {
        let (reader, writer) = io::pipe()?;
        let stderr = writer.try_clone()?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(&self.env.vars)
            .current_dir(&self.env.current_dir)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr);
        let child = cmd.spawn()?;

        // Our copies of the write end live in `cmd`; the reader sees EOF only
        // once they are closed.
        drop(cmd);
        Ok((child, reader))
    }

    fn should_log(&self, command: &str) {
        if self.verbose {
            eprintln!("+ {command}");
        }
        if let Some(hook) = &self.log_hook {
            hook(command);
        }
    }

    fn should_log_error(&self, msg: &str) {
        if self.verbose {
            eprintln!("{msg}");
        }
        if let Some(hook) = &self.log_hook {
            hook(msg);
        }
    }

    fn should_panic(&self, msg: &str) {
        if let Some(hook) = &self.panic_hook {
            hook(msg);
        }
    }
}

impl Default for Echo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |msg: &str| sink.borrow_mut().push(msg.to_string()))
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("echo   a\n\tb"), "echo a b");
        assert_eq!(normalize("\n  ls -l \r\n"), "ls -l");
        assert_eq!(normalize(""), "");
    }

    #[test]
    #[cfg(unix)]
    fn run_expands_variables_in_command_and_output() {
        let mut echo = Echo::new();
        echo.set_var("GREETING", "hello");
        assert_eq!(echo.run("echo $GREETING"), "hello\n");

        // the command prints "$GREETING", which is then expanded
        assert_eq!(echo.run("printf '$%s there' GREETING"), "hello there");
    }

    #[test]
    #[cfg(unix)]
    fn custom_resolver_overrides_table() {
        let mut echo = Echo::new().with_resolver(|name: &str| format!("<{name}>"));
        assert_eq!(echo.val("ANY"), "<ANY>");
        assert_eq!(echo.run("printf $X"), "<X>");
    }

    #[test]
    #[cfg(unix)]
    fn log_hook_sees_normalized_command() {
        let (seen, hook) = recorder();
        let mut echo = Echo::new().with_log_hook(hook);
        echo.run("printf\n  ok");
        assert_eq!(seen.borrow().as_slice(), ["printf ok"]);
    }

    #[test]
    fn failed_run_calls_both_hooks() {
        let (logged, log_hook) = recorder();
        let (panicked, panic_hook) = recorder();
        let mut echo = Echo::new()
            .with_log_hook(log_hook)
            .with_panic_hook(panic_hook);

        assert_eq!(echo.run("definitely-not-a-command-42"), "");

        let logged = logged.borrow();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0], "definitely-not-a-command-42");
        assert!(logged[1].contains("definitely-not-a-command-42"));
        assert_eq!(panicked.borrow().len(), 1);
    }

    #[test]
    fn empty_command_is_recorded() {
        let mut echo = Echo::new();
        let proc = echo.run_proc("   \n ");
        assert!(matches!(proc.err(), Some(ProcError::EmptyCommand)));
        assert_eq!(echo.procs().len(), 1);
    }

    #[test]
    fn split_failure_is_recorded() {
        let mut echo = Echo::new();
        let proc = echo.run_proc("echo 'unterminated");
        assert!(matches!(proc.err(), Some(ProcError::Split { .. })));
        assert_eq!(proc.id(), None);
    }

    #[test]
    #[cfg(unix)]
    fn custom_splitter_is_used() {
        let mut echo = Echo::new().with_splitter(|cmd: &str| {
            vec!["printf".to_string(), "%s".to_string(), cmd.to_string()]
        });
        assert_eq!(echo.run("a  b"), "a b");
    }

    #[test]
    #[cfg(unix)]
    fn commands_run_in_current_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut echo = Echo::new();
        echo.set_current_dir(tmp.path());
        let out = echo.run("pwd");
        let expected = tmp.path().canonicalize().unwrap();
        assert_eq!(
            PathBuf::from(out.trim_end()).canonicalize().unwrap(),
            expected
        );
    }

    #[test]
    #[cfg(unix)]
    fn runout_to_writes_result() {
        let mut echo = Echo::new();
        let mut out = Vec::new();
        echo.runout_to("echo hi", &mut out).unwrap();
        assert_eq!(out, b"hi\n");
    }
}
