use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("notes-cli").chain(args.iter().copied())).unwrap()
}

#[test]
fn list_defaults_match_notes_view() {
    let cli = parse(&["notes", "list"]);
    let Command::Notes(NotesCommand { command: NotesSubcommand::List(args) }) = cli.command else {
        panic!("expected notes list");
    };
    assert_eq!(args.filter().query_string(), "sortBy=updated_at&sortDir=DESC&limit=50");
}

#[test]
fn list_flags_build_filter() {
    let cli = parse(&["notes", "list", "--q", "plan", "--archived", "--sort-dir", "asc", "--limit", "10", "--offset", "0"]);
    let Command::Notes(NotesCommand { command: NotesSubcommand::List(args) }) = cli.command else {
        panic!("expected notes list");
    };
    assert_eq!(
        args.filter().query_string(),
        "q=plan&archived=true&sortBy=updated_at&sortDir=ASC&limit=10&offset=0"
    );
}

#[test]
fn create_collects_repeated_tags() {
    let cli = parse(&["notes", "create", "--title", "Trip", "--tag", "travel", "--tag", "2025"]);
    let Command::Notes(NotesCommand { command: NotesSubcommand::Create(args) }) = cli.command else {
        panic!("expected notes create");
    };
    let draft = args.draft();
    assert_eq!(draft.title, "Trip");
    assert_eq!(draft.tags, Some(vec!["travel".to_owned(), "2025".to_owned()]));
    assert_eq!(draft.is_archived, None);
}

#[test]
fn update_without_fields_is_empty_patch() {
    let cli = parse(&["notes", "update", "4"]);
    let Command::Notes(NotesCommand { command: NotesSubcommand::Update(args) }) = cli.command else {
        panic!("expected notes update");
    };
    assert!(args.patch().is_empty());
}

#[test]
fn update_can_unarchive() {
    let cli = parse(&["notes", "update", "4", "--archived", "false"]);
    let Command::Notes(NotesCommand { command: NotesSubcommand::Update(args) }) = cli.command else {
        panic!("expected notes update");
    };
    assert_eq!(args.patch().is_archived, Some(false));
}

#[test]
fn protected_routes_cover_session_and_notes_commands() {
    assert_eq!(parse(&["logout"]).command.protected_route(), None);
    assert_eq!(parse(&["whoami"]).command.protected_route().as_deref(), Some("/profile"));
    assert_eq!(parse(&["notes", "list"]).command.protected_route().as_deref(), Some("/notes"));
    assert_eq!(parse(&["notes", "delete", "7"]).command.protected_route().as_deref(), Some("/notes/7"));
}

#[test]
fn login_requires_credentials() {
    let parsed = Cli::try_parse_from(["notes-cli", "login", "--email", "a@b.com", "--password", "secret1"]).unwrap();
    let Command::Login(args) = parsed.command else {
        panic!("expected login");
    };
    assert_eq!(args.email, "a@b.com");
    assert!(Cli::try_parse_from(["notes-cli", "login"]).is_err());
}

#[test]
fn errors_render_friendly_messages() {
    let api = CliError::from(NormalizedError::from_failure(notes_client::GatewayFailure::Status {
        status: 401,
        body: r#"{"message":"Invalid credentials"}"#.to_owned(),
    }));
    assert_eq!(api.to_string(), "Invalid credentials");

    let denied = CliError::NotAuthenticated { redirect: "/login?redirect=%2Fnotes".to_owned() };
    let rendered = denied.to_string();
    assert!(rendered.contains("run `notes-cli login` first"));
    assert!(rendered.contains("/login?redirect=%2Fnotes"));
}
