use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use session_guard::config::ConfigError;
use session_guard::navigation::{AllowList, NavigationError, PageStack};
use session_guard::session::AvatarSettings;
use session_guard::{
    AppConfig, FileBackend, GuardPolicy, HttpRemoteApi, NavigationGuard, NavigationPrimitive,
    PersistentStore, RemoteError, SessionError, SessionService, StorageTokenStore,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "session-shell", about = "Session and navigation guard shell")]
struct Cli {
    /// Overrides `SESSION_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `SESSION_STORAGE_PATH`.
    #[arg(long)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SESSION_PASSWORD")]
        password: String,
        #[arg(long, default_value = "")]
        code: String,
        #[arg(long, default_value = "")]
        uuid: String,
        /// Load the profile right after signing in.
        #[arg(long)]
        profile: bool,
    },
    /// Fetch the profile and print the raw response.
    Profile,
    /// Sign out and clear stored session data.
    Logout,
    /// Print the stored session.
    Whoami,
    /// Replace the stored avatar.
    Avatar { url: String },
    /// Run one navigation through the guard and print the resulting page stack.
    ///
    /// Each invocation starts from a fresh stack holding only `/`, so the
    /// output reflects this single navigation, not earlier runs.
    Navigate {
        /// `navigateTo`, `redirectTo`, `reLaunch` or `switchTab`.
        primitive: String,
        url: String,
    },
    /// Check permissions against the stored session.
    CheckPermi {
        #[arg(required = true)]
        permissions: Vec<String>,
        /// Require all instead of any.
        #[arg(long)]
        all: bool,
    },
    /// Check roles against the stored session.
    CheckRole {
        #[arg(required = true)]
        roles: Vec<String>,
        #[arg(long)]
        all: bool,
    },
}

struct Shell {
    config: AppConfig,
    session: SessionService,
}

impl Shell {
    fn build(cli: &Cli) -> Result<Self, CliError> {
        let mut config = AppConfig::from_env()?;
        if let Some(base_url) = &cli.base_url {
            config.base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(path) = &cli.storage_path {
            config.storage_path.clone_from(path);
        }

        let backend = Arc::new(FileBackend::open(&config.storage_path));
        let tokens = Arc::new(StorageTokenStore::new(backend.clone()));
        let store = PersistentStore::new(backend);
        let api = Arc::new(HttpRemoteApi::new(&config.base_url, config.timeouts, tokens.clone())?);
        let session = SessionService::initialize(api, tokens, store, AvatarSettings::from(&config));
        Ok(Self { config, session })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let shell = Shell::build(&cli)?;
    tracing::debug!(base_url = %shell.config.base_url, storage = %shell.config.storage_path.display(), "shell ready");

    match cli.command {
        Command::Login { username, password, code, uuid, profile } => {
            shell.session.login(&username, &password, &code, &uuid).await?;
            println!("signed in");
            if profile {
                let result = shell.session.fetch_profile().await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(())
        }
        Command::Profile => {
            let result = shell.session.fetch_profile().await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Logout => {
            shell.session.logout().await?;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => run_whoami(&shell),
        Command::Avatar { url } => {
            shell.session.set_avatar(&url)?;
            println!("{}", shell.session.snapshot().avatar_url);
            Ok(())
        }
        Command::Navigate { primitive, url } => run_navigate(&shell, &primitive, &url),
        Command::CheckPermi { permissions, all } => {
            let record = shell.session.snapshot();
            let granted = if all { record.has_permi_and(&permissions) } else { record.has_permi_or(&permissions) };
            println!("{granted}");
            Ok(())
        }
        Command::CheckRole { roles, all } => {
            let record = shell.session.snapshot();
            let granted = if all { record.has_role_and(&roles) } else { record.has_role_or(&roles) };
            println!("{granted}");
            Ok(())
        }
    }
}

fn run_whoami(shell: &Shell) -> Result<(), CliError> {
    let record = shell.session.snapshot();
    let mut rendered = serde_json::to_value(&record)?;
    if let Some(fields) = rendered.as_object_mut() {
        fields.insert("authenticated".into(), record.is_authenticated().into());
    }
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn run_navigate(shell: &Shell, primitive: &str, url: &str) -> Result<(), CliError> {
    let primitive: NavigationPrimitive = primitive.parse()?;
    let stack = Arc::new(PageStack::with_root("/"));
    let policy = GuardPolicy::new(AllowList::default(), shell.config.login_page.clone());
    let guard = NavigationGuard::new(shell.session.clone(), policy, stack.clone());

    let proceeded = guard.dispatch(primitive, url);
    println!("{}", if proceeded { "proceeded" } else { "suppressed" });
    for page in stack.pages() {
        println!("  {page}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
