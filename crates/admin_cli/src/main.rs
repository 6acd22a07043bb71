use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, Snapshot};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "subtrack_admin")]
#[command(about = "Admin utilities for Subtrack (users, snapshot export/import)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./subtrack.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account. The password is asked interactively.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[command(subcommand)]
    command: SnapshotCommand,
}

#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Write the user's data as a JSON snapshot.
    Export(ExportArgs),
    /// Merge a JSON snapshot into the user's data.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    user: String,
    /// Output file. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    file: PathBuf,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn clear_line_and_print(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message)
    )?;
    out.flush()?;
    Ok(())
}

/// Read a password from the terminal, echoing `*` for each character.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;
    clear_line_and_print(prompt)?;

    let mut out = std::io::stderr();
    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace if buf.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            clear_line_and_print("Password must not be empty.\r\n")?;
            continue;
        }
        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        clear_line_and_print("Passwords do not match. Try again.\r\n")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn require_user(
    engine: &Engine,
    username: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !engine.user_exists(username).await? {
        eprintln!("user not found: {username}");
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            match engine.create_user(&args.username, &password).await {
                Ok(()) => println!("created user: {}", args.username),
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.username);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Snapshot(SnapshotArgs {
            command: SnapshotCommand::Export(args),
        }) => {
            require_user(&engine, &args.user).await?;
            let snapshot = engine.for_user(&args.user).export_snapshot().await?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            match args.out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("exported {} to {}", args.user, path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Snapshot(SnapshotArgs {
            command: SnapshotCommand::Import(args),
        }) => {
            require_user(&engine, &args.user).await?;
            let raw = std::fs::read_to_string(&args.file)?;
            let snapshot: Snapshot = serde_json::from_str(&raw)?;
            let report = engine.for_user(&args.user).import_snapshot(snapshot).await?;
            println!(
                "imported into {}: {} genres, {} subscriptions, {} memberships, {} meal records",
                args.user,
                report.genres_created,
                report.subscriptions_created,
                report.memberships_created,
                report.daily_meals_created
            );
        }
    }

    Ok(())
}
