use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use notes_client::config::ConfigError;
use notes_client::net::notes::{NoteFilter, SortDirection};
use notes_client::net::types::{NoteDraft, NotePatch};
use notes_client::storage::file::FileStorage;
use notes_client::util::auth::post_login_destination;
use notes_client::{ClientConfig, NormalizedError, NotesClientServices};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

const STATE_FILE_NAME: &str = ".notes-client.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] NormalizedError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("not logged in; run `notes-cli login` first (redirect: {redirect})")]
    NotAuthenticated { redirect: String },
    #[error("nothing to update; pass at least one field")]
    EmptyPatch,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "notes-cli", about = "Personal notes API CLI")]
struct Cli {
    #[arg(long, env = "NOTES_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "NOTES_STATE_FILE", help = "Session file holding the bearer token")]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(CredentialsArgs),
    Register(CredentialsArgs),
    Logout,
    Whoami,
    Notes(NotesCommand),
}

impl Command {
    /// Route this command maps to, when it is a protected view.
    fn protected_route(&self) -> Option<String> {
        match self {
            Self::Login(_) | Self::Register(_) | Self::Logout => None,
            Self::Whoami => Some("/profile".to_owned()),
            Self::Notes(notes) => Some(match &notes.command {
                NotesSubcommand::List(_) | NotesSubcommand::Create(_) => "/notes".to_owned(),
                NotesSubcommand::Get { id } | NotesSubcommand::Delete { id } => format!("/notes/{id}"),
                NotesSubcommand::Update(args) => format!("/notes/{}", args.id),
            }),
        }
    }
}

#[derive(Args, Debug)]
struct CredentialsArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "NOTES_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct NotesCommand {
    #[command(subcommand)]
    command: NotesSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotesSubcommand {
    List(ListArgs),
    Get { id: i64 },
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete { id: i64 },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortDir {
    Asc,
    Desc,
}

impl From<SortDir> for SortDirection {
    fn from(value: SortDir) -> Self {
        match value {
            SortDir::Asc => Self::Ascending,
            SortDir::Desc => Self::Descending,
        }
    }
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, help = "Free-text search")]
    q: Option<String>,

    #[arg(long)]
    tag: Option<String>,

    #[arg(long, default_value_t = false, help = "Show archived notes")]
    archived: bool,

    #[arg(long, default_value = "updated_at")]
    sort_by: String,

    #[arg(long, value_enum, default_value_t = SortDir::Desc)]
    sort_dir: SortDir,

    #[arg(long, default_value_t = 50)]
    limit: u32,

    #[arg(long)]
    offset: Option<u32>,
}

impl ListArgs {
    fn filter(&self) -> NoteFilter {
        NoteFilter {
            query: self.q.clone(),
            tag: self.tag.clone(),
            archived: Some(self.archived),
            sort_field: self.sort_by.clone(),
            sort_direction: self.sort_dir.into(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    content: Option<String>,

    #[arg(long = "tag", help = "Repeat for multiple tags")]
    tags: Vec<String>,

    #[arg(long, default_value_t = false)]
    archived: bool,
}

impl CreateArgs {
    fn draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            is_archived: self.archived.then_some(true),
        }
    }
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: i64,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    content: Option<String>,

    #[arg(long = "tag", help = "Replaces all tags; repeat for multiple")]
    tags: Vec<String>,

    #[arg(long, help = "Set or clear the archived flag")]
    archived: Option<bool>,
}

impl UpdateArgs {
    fn patch(&self) -> NotePatch {
        NotePatch {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            is_archived: self.archived,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    let storage = FileStorage::new(cli.state_file.clone().unwrap_or_else(default_state_file));
    let services = NotesClientServices::interactive(&config, Arc::new(storage));

    if let Some(route) = cli.command.protected_route() {
        services.start().await;
        let decision = services.guard.check(&route);
        if let Some(redirect) = decision.redirect_url() {
            return Err(CliError::NotAuthenticated { redirect });
        }
    }

    match cli.command {
        Command::Login(args) => {
            let user = services.session.login(&args.email, &args.password).await?;
            print_json(&user)?;
            eprintln!("signed in; continue at {}", post_login_destination(None));
            Ok(())
        }
        Command::Register(args) => {
            let user = services.session.register(&args.email, &args.password).await?;
            print_json(&user)?;
            Ok(())
        }
        Command::Logout => {
            services.session.logout();
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami => {
            let user = services.session.current_user();
            print_json(&user)?;
            Ok(())
        }
        Command::Notes(notes) => run_notes(&services, notes).await,
    }
}

async fn run_notes(services: &NotesClientServices, notes: NotesCommand) -> Result<(), CliError> {
    match notes.command {
        NotesSubcommand::List(args) => {
            let listed = services.notes.list(&args.filter()).await?;
            print_json(&listed)
        }
        NotesSubcommand::Get { id } => {
            let note = services.notes.get(id).await?;
            print_json(&note)
        }
        NotesSubcommand::Create(args) => {
            let note = services.notes.create(&args.draft()).await?;
            print_json(&note)
        }
        NotesSubcommand::Update(args) => {
            let patch = args.patch();
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            let note = services.notes.update(args.id, &patch).await?;
            print_json(&note)
        }
        NotesSubcommand::Delete { id } => {
            services.notes.delete(id).await?;
            eprintln!("deleted note {id}");
            Ok(())
        }
    }
}

fn default_state_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(STATE_FILE_NAME)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
