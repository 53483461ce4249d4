/*!
 * Console Commands
 * Parsing of command lines typed at the console
 */

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the scheduler from configuration
    Initialize,
    /// `screen -s <name>`: create a process and attach to it
    ScreenCreate(String),
    /// `screen -r <name>`: reattach to an existing process
    ScreenResume(String),
    /// `screen -ls`: list processes grouped by state
    ScreenList,
    /// `scheduler-test` / `scheduler-start`
    SchedulerStart,
    /// `scheduler-stop`
    SchedulerStop,
    /// Write the process listing to the report file
    ReportUtil,
    /// `report-util --json`: the same listing as JSON
    ReportJson,
    /// Show the attached process
    ProcessSmi,
    Clear,
    Exit,
    /// Blank line
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse one input line
    ///
    /// Command words and flags are case-insensitive; process names are not.
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Empty;
        };
        let head = head.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match (head.as_str(), args.as_slice()) {
            ("initialize", []) => Command::Initialize,
            ("screen", [flag, name]) if flag.eq_ignore_ascii_case("-s") => {
                Command::ScreenCreate((*name).to_string())
            }
            ("screen", [flag, name]) if flag.eq_ignore_ascii_case("-r") => {
                Command::ScreenResume((*name).to_string())
            }
            ("screen", [flag]) if flag.eq_ignore_ascii_case("-ls") => Command::ScreenList,
            ("scheduler-test" | "scheduler-start", []) => Command::SchedulerStart,
            ("scheduler-stop", []) => Command::SchedulerStop,
            ("report-util", []) => Command::ReportUtil,
            ("report-util", [flag]) if flag.eq_ignore_ascii_case("--json") => Command::ReportJson,
            ("process-smi", []) => Command::ProcessSmi,
            ("clear", []) => Command::Clear,
            ("exit", []) => Command::Exit,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}
