use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{CreateUserCmd, Engine, EngineError, UserRole};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "lexfin_admin")]
#[command(about = "Admin utilities for lexfin (bootstrap users and roles)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./lexfin.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Print an argon2 hash of a prompted password.
    HashPassword,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    /// Change the role of an existing user.
    Role(UserRoleArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long, value_enum, default_value_t = Role::Common)]
    role: Role,
}

#[derive(Args, Debug)]
struct UserRoleArgs {
    email: String,
    #[arg(value_enum)]
    role: Role,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Common,
    Admin,
    Lawyer,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Common => UserRole::Common,
            Role::Admin => UserRole::Admin,
            Role::Lawyer => UserRole::Lawyer,
        }
    }
}

const MIN_PASSWORD_LEN: usize = 6;
const PROMPT_ATTEMPTS: usize = 3;

/// Keeps the terminal in raw mode while alive.
struct RawTerminal;

impl RawTerminal {
    fn enable() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(text)
    )?;
    out.flush()
}

/// Read a secret without echoing it; each typed character shows as `*`.
fn read_secret(label: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawTerminal::enable()?;
    let mut out = std::io::stderr();
    print_line(&mut out, label)?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if ctrl => {
                print_line(&mut out, "\r\n")?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace if secret.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !ctrl => {
                secret.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }
    execute!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(secret)
}

/// Ask for a new password and its confirmation, retrying a few times.
fn read_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..PROMPT_ATTEMPTS {
        let password = read_secret("Password: ")?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            print_line(
                &mut out,
                &format!("Password needs at least {MIN_PASSWORD_LEN} characters.\r\n"),
            )?;
            continue;
        }
        if read_secret("Confirm password: ")? == password {
            return Ok(password);
        }
        print_line(&mut out, "Passwords do not match.\r\n")?;
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

async fn engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = connect_db(database_url).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let engine = engine(&cli.database_url).await?;
            let password = read_new_password()?;

            let created = engine
                .provision_user(CreateUserCmd {
                    name: args.name,
                    email: args.email,
                    password,
                    role: args.role.into(),
                })
                .await;
            match created {
                Ok(user) => println!("created user: {} ({})", user.email, user.role.as_str()),
                Err(EngineError::ExistingKey(email)) => {
                    eprintln!("user already exists: {email}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::Role(args),
        }) => {
            let engine = engine(&cli.database_url).await?;
            match engine.provision_role(&args.email, args.role.into()).await {
                Ok(user) => println!("{} is now {}", user.email, user.role.as_str()),
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!("user not found: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::HashPassword => {
            let password = read_new_password()?;
            println!("{}", engine::hash_password(&password)?);
        }
    }

    Ok(())
}
