/*!
 * Console
 *
 * Line-oriented front end. It only creates processes, lists them and
 * starts/stops the scheduler; all scheduling happens in the worker cores.
 */

use super::command::Command;
use crate::process::{ProcessState, ProcessView};
use crate::scheduler::{Scheduler, SchedulerConfig};
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

const LOGO: &str = r"  ___  ____   __   ____  ____  ____  _  _
 / __)/ ___) /  \ (  _ \(  __)/ ___)( \/ )
( (__ \___ \(  O ) ) __/ ) _) \___ \ )  /
 \___)(____/ \__/ (__)  (____)(____/(__/
";

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Which screen the console is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Main,
    /// Attached to a process
    Process(String),
}

/// Text to print after a command, and whether the console should quit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub exit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit: false,
        }
    }
}

/// Console session state
pub struct Console {
    config: SchedulerConfig,
    scheduler: Option<Scheduler>,
    screen: Screen,
}

impl Console {
    /// Console that builds its scheduler from `config` on `initialize`
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            scheduler: None,
            screen: Screen::Main,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    /// Logo and greeting
    pub fn banner() -> String {
        format!(
            "{LOGO}\x1b[32mHello. Welcome to CSOPESY commandline!\x1b[0m\n\
             Type \x1b[33m'exit'\x1b[0m to quit, \x1b[33m'clear'\x1b[0m to clear the screen\n"
        )
    }

    pub fn prompt(&self) -> String {
        match &self.screen {
            Screen::Main => "> ".to_string(),
            Screen::Process(name) => format!("{}> ", name),
        }
    }

    /// Read commands until `exit` or end of input
    ///
    /// End of input is treated as `exit`, so running cores are always
    /// stopped and joined.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(Self::banner().as_bytes()).await?;
        let mut lines = input.lines();

        loop {
            output.write_all(self.prompt().as_bytes()).await?;
            output.flush().await?;

            let command = match lines.next_line().await? {
                Some(line) => Command::parse(&line),
                None => {
                    // Quit from whichever screen is showing
                    self.screen = Screen::Main;
                    Command::Exit
                }
            };
            let reply = self.execute(command).await;
            if !reply.output.is_empty() {
                output.write_all(reply.output.as_bytes()).await?;
                if !reply.output.ends_with('\n') {
                    output.write_all(b"\n").await?;
                }
            }
            if reply.exit {
                output.flush().await?;
                return Ok(());
            }
        }
    }

    /// Execute one command
    pub async fn execute(&mut self, command: Command) -> Reply {
        match self.screen.clone() {
            Screen::Main => self.execute_main(command).await,
            Screen::Process(name) => self.execute_process(&name, command),
        }
    }

    async fn execute_main(&mut self, command: Command) -> Reply {
        match command {
            Command::Empty => Reply::default(),
            Command::Clear => Reply::text(format!("{}{}", CLEAR_SCREEN, Self::banner())),
            Command::Unknown(line) => Reply::text(format!("Unknown command: {}", line)),
            Command::ProcessSmi => Reply::text("Unknown command: process-smi"),
            Command::Exit => self.exit().await,
            Command::Initialize => self.initialize(),
            command => self.dispatch(command).await,
        }
    }

    fn initialize(&mut self) -> Reply {
        if self.scheduler.is_some() {
            return Reply::text("Already initialized.");
        }
        match Scheduler::new(self.config.clone()) {
            Ok(scheduler) => {
                let message = format!(
                    "Initialized: {} cores, {} work units per process, output in {}",
                    self.config.num_cpu,
                    self.config.work_units,
                    self.config.output_dir.display()
                );
                self.scheduler = Some(scheduler);
                Reply::text(message)
            }
            Err(e) => Reply::text(format!("Initialization failed: {}", e)),
        }
    }

    /// Commands that need an initialized scheduler
    async fn dispatch(&mut self, command: Command) -> Reply {
        let Some(scheduler) = &self.scheduler else {
            return Reply::text("Please run 'initialize' first.");
        };

        match command {
            Command::ScreenCreate(name) => match scheduler.create_process(&name) {
                Ok(()) => match scheduler.process(&name) {
                    Ok(view) => {
                        let text = process_screen(&view);
                        self.screen = Screen::Process(name);
                        Reply::text(format!("{}{}", CLEAR_SCREEN, text))
                    }
                    Err(e) => Reply::text(e.to_string()),
                },
                Err(e) => Reply::text(e.to_string()),
            },
            Command::ScreenResume(name) => match scheduler.process(&name) {
                Ok(view) if view.state.is_terminal() => Reply::text(format!(
                    "Process '{}' has {} and cannot be resumed.",
                    name, view.state
                )),
                Ok(view) => {
                    let text = process_screen(&view);
                    self.screen = Screen::Process(name);
                    Reply::text(format!("{}{}", CLEAR_SCREEN, text))
                }
                Err(e) => Reply::text(e.to_string()),
            },
            Command::ScreenList => Reply::text(scheduler.snapshot().render()),
            Command::SchedulerStart => match scheduler.start() {
                Ok(outcome) => Reply::text(outcome.to_string()),
                Err(e) => Reply::text(format!("Could not start scheduler: {}", e)),
            },
            Command::SchedulerStop => Reply::text(scheduler.stop().to_string()),
            Command::ReportUtil => {
                let path = scheduler.config().report_path();
                match tokio::fs::write(&path, scheduler.snapshot().render()).await {
                    Ok(()) => {
                        info!(path = %path.display(), "Utilization report written");
                        Reply::text(format!("Report generated at {}", path.display()))
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Report write failed");
                        Reply::text(format!("Could not write report to {}: {}", path.display(), e))
                    }
                }
            }
            Command::ReportJson => {
                let path = scheduler.config().report_json_path();
                let json = match scheduler.snapshot().to_json() {
                    Ok(json) => json,
                    Err(e) => return Reply::text(format!("Could not encode report: {}", e)),
                };
                match tokio::fs::write(&path, json).await {
                    Ok(()) => {
                        info!(path = %path.display(), "JSON report written");
                        Reply::text(format!("Report generated at {}", path.display()))
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Report write failed");
                        Reply::text(format!("Could not write report to {}: {}", path.display(), e))
                    }
                }
            }
            other => Reply::text(format!("Unknown command: {:?}", other)),
        }
    }

    fn execute_process(&mut self, name: &str, command: Command) -> Reply {
        match command {
            Command::Empty => Reply::default(),
            Command::Exit => {
                self.screen = Screen::Main;
                Reply::text(format!("{}{}", CLEAR_SCREEN, Self::banner()))
            }
            Command::ProcessSmi | Command::Clear => {
                let prefix = if command == Command::Clear { CLEAR_SCREEN } else { "" };
                match self.scheduler.as_ref().map(|s| s.process(name)) {
                    Some(Ok(view)) => Reply::text(format!("{}{}", prefix, process_screen(&view))),
                    Some(Err(e)) => Reply::text(e.to_string()),
                    None => Reply::text("Please run 'initialize' first."),
                }
            }
            _ => Reply::text(
                "Unknown command. Use 'process-smi' to view the process or 'exit' to return.",
            ),
        }
    }

    async fn exit(&mut self) -> Reply {
        let mut output = String::new();
        if let Some(scheduler) = &self.scheduler {
            for failure in scheduler.shutdown().await {
                let _ = writeln!(output, "Core failure: {}", failure);
            }
        }
        output.push_str("Exiting.");
        Reply { output, exit: true }
    }
}

/// Per-process screen
fn process_screen(view: &ProcessView) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Process: {}", view.name);
    let _ = writeln!(text, "Created: {}", view.created_at);
    match (view.state, view.core) {
        (ProcessState::Waiting, _) => {
            let _ = writeln!(text, "State: waiting for a free core");
        }
        (state, Some(core)) => {
            let _ = writeln!(text, "State: {} (core {})", state, core);
        }
        (state, None) => {
            let _ = writeln!(text, "State: {}", state);
        }
    }
    let _ = writeln!(text, "Current instruction line: {}", view.progress);
    let _ = writeln!(text, "Lines of code: {}", view.total);
    if view.is_finished() {
        let _ = writeln!(text, "Finished!");
    }
    text
}
