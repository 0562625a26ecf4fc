use application::notice::{Notice, NoticeLevel};
use application::workspace::Workspace;
use clap::Parser;
use colored::Colorize;
use dialoguer::Select;
use domain::backend::DocumentBackend;
use domain::models::{Credentials, FileId, FileRecord, FileUpload, Message, Role};
use infrastructure::config::Config;
use shared::confirmation::{ask_confirmation, ask_secret, ask_text};
use shared::types::Result;
use shared::utils::{default_upload_name, source_file_name};
use std::path::{Path, PathBuf};

const HELP: &str = "\
Commands:
  files                 list uploaded files
  show <n|id>           print a file's content
  select <n|id>         chat with a file
  history               print the current conversation
  key [value]           set the external API key (prompts when omitted)
  upload <path> [name]  upload a document
  ask <text>            ask about the selected file (bare text works too;
                        use ask when the question starts with `upload`)
  logout                end the session
  quit                  exit";

#[derive(Parser, Debug, Default)]
#[command(name = "docchat")]
#[command(about = "Chat with your uploaded documents", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides DOCCHAT_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Tracing filter, e.g. "debug" (overrides DOCCHAT_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Request timeout in seconds (overrides DOCCHAT_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// External API key forwarded on upload and query
    #[arg(long)]
    pub external_api_key: Option<String>,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(secs) = self.timeout.filter(|s| *s > 0) {
            config.request_timeout_secs = secs;
        }
        if let Some(key) = &self.external_api_key {
            config.external_api_key = Some(key.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Files,
    Show(String),
    Select(String),
    History,
    Key(Option<String>),
    Upload { path: PathBuf, name: Option<String> },
    Ask(String),
    Logout,
    Quit,
}

impl Command {
    /// Anything that does not start with a known command word is a query.
    /// A command word followed by arguments it does not take (`files of
    /// 2023?`, `show me the policy`) is a query too.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let query = || -> std::result::Result<Self, String> { Ok(Self::Ask(line.to_string())) };
        let bare = |command: Self| if rest.is_empty() { Ok(command) } else { query() };
        let one_arg = |usage: &str, command: fn(String) -> Self| {
            if rest.is_empty() {
                Err(format!("Usage: {usage}"))
            } else if rest.contains(char::is_whitespace) {
                query()
            } else {
                Ok(command(rest.to_string()))
            }
        };
        match word.to_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "help" | "?" => bare(Self::Help),
            "files" => bare(Self::Files),
            "history" => bare(Self::History),
            "logout" => bare(Self::Logout),
            "quit" | "exit" => bare(Self::Quit),
            "show" => one_arg("show <n|id>", Self::Show),
            "select" => one_arg("select <n|id>", Self::Select),
            "key" if rest.is_empty() => Ok(Self::Key(None)),
            "key" => one_arg("key [value]", |key| Self::Key(Some(key))),
            "ask" if rest.is_empty() => Err("Usage: ask <text>".to_string()),
            "ask" => Ok(Self::Ask(rest.to_string())),
            "upload" => {
                if rest.is_empty() {
                    return Err("Usage: upload <path> [name]".to_string());
                }
                let (path, name) = match rest.split_once(char::is_whitespace) {
                    Some((path, name)) => (path, Some(name.trim().to_string())),
                    None => (rest, None),
                };
                Ok(Self::Upload {
                    path: PathBuf::from(path),
                    name,
                })
            }
            _ => query(),
        }
    }
}

/// Looks `reference` up as a file id first, then as a 1-based position.
/// `#n` always means position `n`.
pub fn resolve_file(reference: &str, files: &[FileRecord]) -> Option<FileId> {
    let reference = reference.trim();
    if let Some(position) = reference.strip_prefix('#') {
        return file_at(position, files);
    }
    files
        .iter()
        .find(|f| f.id.as_str() == reference)
        .map(|f| f.id.clone())
        .or_else(|| file_at(reference, files))
}

fn file_at(position: &str, files: &[FileRecord]) -> Option<FileId> {
    position
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| files.get(i))
        .map(|f| f.id.clone())
}

pub struct CliApp<B> {
    workspace: Workspace<B>,
}

impl<B: DocumentBackend + Clone> CliApp<B> {
    pub fn new(backend: B) -> Self {
        Self {
            workspace: Workspace::new(backend),
        }
    }

    pub fn with_workspace(workspace: Workspace<B>) -> Self {
        Self { workspace }
    }

    pub fn with_external_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self.workspace.set_external_api_key(key);
        }
        self
    }

    pub fn workspace(&self) -> &Workspace<B> {
        &self.workspace
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "docchat: ask questions about your documents".bold());
        loop {
            if !self.workspace.session().is_authenticated() {
                if !self.login_view().await? {
                    break;
                }
                continue;
            }
            let line = ask_text(&self.prompt())?;
            match Command::parse(&line) {
                Ok(command) => {
                    if !self.dispatch(command).await? {
                        break;
                    }
                }
                Err(usage) => println!("{}", usage.yellow()),
            }
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let user = self
            .workspace
            .session()
            .user()
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        match self.workspace.selected() {
            Some(file) => format!("{user} @ {}", file.file_name),
            None => user.to_string(),
        }
    }

    /// Returns false when the user chose to quit.
    async fn login_view(&mut self) -> Result<bool> {
        let choice = Select::new()
            .with_prompt("Login or signup")
            .items(&["Login", "Signup", "Quit"])
            .default(0)
            .interact()?;
        if choice == 2 {
            return Ok(false);
        }
        let username = ask_text("Username")?;
        let password = ask_secret("Password")?;
        let credentials = Credentials::new(username, password);
        if choice == 0 {
            for notice in self.workspace.login(&credentials).await {
                print_notice(&notice);
            }
            if self.workspace.session().is_authenticated() {
                self.print_files();
                println!("{}", "Type 'help' for commands.".dimmed());
            }
        } else {
            print_notice(&self.workspace.signup(&credentials).await);
        }
        Ok(true)
    }

    /// Runs one command. Returns false when the shell should exit.
    pub async fn dispatch(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Empty => {}
            Command::Help => println!("{HELP}"),
            Command::Files => {
                if let Some(notice) = self.workspace.refresh_files().await {
                    print_notice(&notice);
                }
                self.print_files();
            }
            Command::Show(reference) => match self.resolve(&reference) {
                Some(id) => match self.workspace.file_detail(&id).await {
                    Ok(detail) => println!("{detail}"),
                    Err(notice) => print_notice(&notice),
                },
                None => print_notice(&unknown_file(&reference)),
            },
            Command::Select(reference) => match self.resolve(&reference) {
                Some(id) => {
                    if let Some(notice) = self.workspace.select_file(&id).await {
                        print_notice(&notice);
                    }
                    self.print_history();
                }
                None => print_notice(&unknown_file(&reference)),
            },
            Command::History => self.print_history(),
            Command::Key(value) => {
                let key = match value {
                    Some(key) => key,
                    None => ask_secret("External API key")?,
                };
                print_notice(&self.workspace.set_external_api_key(key.trim()));
            }
            Command::Upload { path, name } => self.upload(&path, name).await,
            Command::Ask(text) => {
                match self.workspace.send_query(&text).await {
                    Some(notice) => print_notice(&notice),
                    None => {
                        if let Some(answer) = self.workspace.conversation().messages().last() {
                            print_message(answer);
                        }
                    }
                }
            }
            Command::Logout => {
                if ask_confirmation("Log out?", true)? {
                    print_notice(&self.workspace.logout());
                }
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn resolve(&self, reference: &str) -> Option<FileId> {
        resolve_file(reference, self.workspace.catalog().files())
    }

    async fn upload(&mut self, path: &Path, name: Option<String>) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                print_notice(&Notice::error(format!("Could not read {}: {err}", path.display())));
                return;
            }
        };
        let upload = FileUpload {
            file_name: name
                .or_else(|| default_upload_name(path))
                .unwrap_or_default(),
            source_name: source_file_name(path),
            bytes: Some(bytes),
        };
        println!("{}", "Uploading...".cyan());
        for notice in self.workspace.upload(&upload).await {
            print_notice(&notice);
        }
    }

    fn print_files(&self) {
        let files = self.workspace.catalog().files();
        if files.is_empty() {
            println!("{}", "No files have been uploaded yet.".dimmed());
            return;
        }
        let selected = self.workspace.selected().map(|f| &f.id);
        for (i, file) in files.iter().enumerate() {
            let marker = if Some(&file.id) == selected { "*" } else { " " };
            println!(
                "{marker} {} {} {}",
                format!("[{}]", i + 1).blue(),
                file.file_name,
                format!("(id {})", file.id).dimmed()
            );
        }
    }

    fn print_history(&self) {
        let conversation = self.workspace.conversation();
        match self.workspace.selected() {
            Some(file) => println!("{} {}", "Chat with:".green().bold(), file.file_name),
            None => println!("{}", "No file selected".yellow()),
        }
        if conversation.messages().is_empty() {
            println!("{}", application::conversation::NO_HISTORY.dimmed());
            return;
        }
        for message in conversation.messages() {
            print_message(message);
        }
    }
}

fn unknown_file(reference: &str) -> Notice {
    Notice::error(format!("No file matches '{reference}'. Run 'files' to list them."))
}

fn print_notice(notice: &Notice) {
    let text = match notice.level {
        NoticeLevel::Info => notice.text.cyan(),
        NoticeLevel::Success => notice.text.green(),
        NoticeLevel::Error => notice.text.red(),
    };
    println!("{text}");
}

fn print_message(message: &Message) {
    match message.role {
        Role::User => println!("{} {}", "You:".green().bold(), message.content),
        Role::Assistant => println!("{} {}", "Bot:".magenta().bold(), message.content),
    }
}
