pub mod about;
pub mod account;
pub mod comment;
pub mod doctor;
pub mod list;
pub mod remove;
pub mod show;
pub mod write;

use std::sync::Arc;

use clap::Subcommand;

use crate::auth::store::SessionStore;
use crate::auth::SessionHolder;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all posts, newest first
    List,
    /// Show a post and its comments
    Show {
        /// Post id
        id: String,
    },
    /// Write a new post (requires sign-in)
    New {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Edit an existing post; omitted fields keep their current value
    Edit {
        /// Post id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post and its comments
    Delete {
        /// Post id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Comment on a post (signed in or anonymously)
    Comment {
        /// Post id
        post_id: String,
        /// Comment text
        content: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// What this tool is
    About,
    /// Check gateway configuration and connectivity
    Doctor,
}

/// Shared per-invocation state: the gateway client plus the session holder
/// with any persisted session restored.
pub struct Context {
    pub gateway: Arc<Gateway>,
    pub holder: SessionHolder,
}

impl Context {
    pub async fn build(config: &Config) -> AppResult<Self> {
        let gateway = Arc::new(Gateway::from_config(config)?);
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::Internal(format!("could not create data directory: {e}")))?;
        let store = SessionStore::new(config.session_path());
        let holder = SessionHolder::new(gateway.clone(), store);
        holder.restore().await;
        Ok(Self { gateway, holder })
    }

    /// The signed-in user, or Unauthorized for session-gated commands.
    pub fn require_user(&self) -> AppResult<crate::gateway::auth::AuthUser> {
        self.holder.snapshot().user.ok_or(AppError::Unauthorized)
    }
}

pub async fn dispatch(command: Command, config: &Config) -> AppResult<()> {
    // About is static and doctor reports on a broken configuration instead
    // of failing on it; neither goes through the gateway setup.
    match command {
        Command::About => {
            about::run();
            return Ok(());
        }
        Command::Doctor => return doctor::run(config).await,
        _ => {}
    }

    let ctx = Context::build(config).await?;
    match command {
        Command::List => list::run(&ctx).await,
        Command::Show { id } => show::run(&ctx, &id).await,
        Command::New { title, content } => write::create(&ctx, &title, &content).await,
        Command::Edit { id, title, content } => write::edit(&ctx, &id, title, content).await,
        Command::Delete { id, yes } => remove::run(&ctx, &id, yes).await,
        Command::Comment { post_id, content } => comment::run(&ctx, &post_id, &content).await,
        Command::Register {
            email,
            username,
            password,
            confirm_password,
        } => account::register(&ctx, &email, &username, &password, &confirm_password).await,
        Command::Login { email, password } => account::login(&ctx, &email, &password).await,
        Command::Logout => account::logout(&ctx).await,
        Command::Whoami => account::whoami(&ctx).await,
        Command::About | Command::Doctor => unreachable!("handled above"),
    }
}
