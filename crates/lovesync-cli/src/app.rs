//! Application state for the LoveSync CLI.
//!
//! `App` wires the configuration, the session store, the router and the
//! toaster together and implements each command on top of them.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use lovesync_core::notify::Toaster;
use lovesync_core::router::{resume_target, Navigation, Router};
use lovesync_core::{ApiClient, ApiError, Config, Credentials, Registration, SessionStore};

use crate::terminal::TerminalToast;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: Option<String>,
        redirect: Option<String>,
    },
    Register,
    WhoAmI,
    Logout,
    Status,
    Open(String),
    Help,
}

impl Command {
    /// Parse command-line arguments (without the program name).
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let Some(first) = args.first() else {
            return Ok(Command::Status);
        };
        let rest = &args[1..];

        match first.as_str() {
            "login" => {
                let mut username = None;
                let mut redirect = None;
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    match arg.as_str() {
                        "--redirect" => {
                            let value = iter.next().ok_or("--redirect needs a location")?;
                            redirect = Some(value.clone());
                        }
                        flag if flag.starts_with("--") => {
                            return Err(format!("Unknown option {}", flag));
                        }
                        name if username.is_none() => username = Some(name.to_string()),
                        extra => return Err(format!("Unexpected argument {}", extra)),
                    }
                }
                Ok(Command::Login { username, redirect })
            }
            "register" => Self::no_args(rest, Command::Register),
            "whoami" => Self::no_args(rest, Command::WhoAmI),
            "logout" => Self::no_args(rest, Command::Logout),
            "status" => Self::no_args(rest, Command::Status),
            "open" => match rest {
                [location] => Ok(Command::Open(location.clone())),
                _ => Err("open needs exactly one location".to_string()),
            },
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => Err(format!("Unknown command {}", other)),
        }
    }

    fn no_args(rest: &[String], command: Command) -> Result<Self, String> {
        if rest.is_empty() {
            Ok(command)
        } else {
            Err(format!("Unexpected argument {}", rest[0]))
        }
    }
}

pub const USAGE: &str = "\
Usage: lovesync <command>

Commands:
  login [username] [--redirect <location>]   Log in and store the token
  register                                   Create a new account
  whoami                                     Fetch the current user
  logout                                     Forget the stored token
  status                                     Show the local session state
  open <location>                            Check whether a page may be opened
  help                                       Show this message

Environment:
  LOVESYNC_API_URL, LOVESYNC_USERNAME, LOVESYNC_PASSWORD, RUST_LOG";

/// Text shown for a command line that does not parse.
pub fn usage_error(message: &str) -> String {
    format!("{}\n\n{}", message, USAGE)
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    config: Config,
    store: SessionStore,
    router: Router,
    toaster: Toaster,
}

impl App {
    pub fn new(config: Config, cache_dir: PathBuf) -> Result<Self> {
        let base_url = std::env::var("LOVESYNC_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| config.api_base_url().to_string());
        debug!(base_url = %base_url, storage = ?config.token_storage, "Building session store");

        let api = ApiClient::new(&base_url)?;
        let storage = config.token_storage_in(&cache_dir);
        let store = SessionStore::new(api, storage).with_policy(config.fetch_failure);

        Ok(Self {
            config,
            store,
            router: Router::default(),
            toaster: Toaster::new(Box::new(TerminalToast)),
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { username, redirect } => self.login(username, redirect).await,
            Command::Register => self.register().await,
            Command::WhoAmI => self.whoami().await,
            Command::Logout => {
                self.logout();
                Ok(())
            }
            Command::Status => {
                self.status();
                Ok(())
            }
            Command::Open(location) => self.open(&location),
            Command::Help => {
                println!("{}", USAGE);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&mut self, username: Option<String>, redirect: Option<String>) -> Result<()> {
        let username = match username.or_else(|| std::env::var("LOVESYNC_USERNAME").ok()) {
            Some(name) => name,
            None => Self::prompt_username(self.config.last_username.as_deref())?,
        };
        let password = match std::env::var("LOVESYNC_PASSWORD") {
            Ok(password) if !password.is_empty() => password,
            _ => Self::prompt_password("Password: ")?,
        };
        Self::validate_input(&username, &password)?;

        match self.store.login(&Credentials::new(username.clone(), password)).await {
            Ok(response) => {
                self.toaster.success(
                    "Logged in",
                    format!("Welcome back, {}", response.user.display_name()),
                );
                self.remember_username(username);

                if let Some(location) = redirect {
                    let navigation = self.resume(&location)?;
                    print_navigation(&navigation);
                }
                Ok(())
            }
            Err(e) => Err(self.report("Login failed", e)),
        }
    }

    async fn register(&mut self) -> Result<()> {
        let username = Self::prompt_username(None)?;
        let email = Self::prompt_line("Email (optional): ")?;
        let password = Self::prompt_password("Password: ")?;
        let confirm = Self::prompt_password("Confirm password: ")?;
        Self::validate_input(&username, &password)?;

        if password != confirm {
            self.toaster.error("Registration failed", "Passwords do not match");
            return Err(anyhow::anyhow!("Passwords do not match"));
        }

        let mut registration = Registration::new(username, password).with_field("password2", confirm);
        if !email.is_empty() {
            registration = registration.with_email(email);
        }

        match self.store.register(&registration).await {
            Ok(_) => {
                self.toaster.success("Registered", "Account created, you can log in now");
                Ok(())
            }
            Err(e) => Err(self.report("Registration failed", e)),
        }
    }

    async fn whoami(&mut self) -> Result<()> {
        if !self.store.is_authenticated() {
            self.toaster.error("Not logged in", "Run `lovesync login` first");
            return Err(anyhow::anyhow!("Not logged in"));
        }

        match self.store.fetch_current_user().await {
            Ok(response) => {
                let user = &response.user;
                println!("{} (@{}, id {})", user.display_name(), user.username, user.id);
                if let Some(ref email) = user.email {
                    println!("{}", email);
                }
                Ok(())
            }
            Err(e) => {
                let title = if self.store.is_authenticated() {
                    "Could not load profile"
                } else {
                    "Session expired"
                };
                Err(self.report(title, e))
            }
        }
    }

    fn logout(&mut self) {
        let was_authenticated = self.store.is_authenticated();
        self.store.logout();
        if was_authenticated {
            self.toaster.success("Logged out", "");
        } else {
            info!("Logout requested without a session");
        }
    }

    fn status(&self) {
        if self.store.is_authenticated() {
            println!("Logged in (token stored)");
        } else {
            println!("Not logged in");
        }
        if self.store.storage_degraded() {
            println!("Warning: token storage unavailable, the session will not persist");
        }
    }

    fn open(&self, location: &str) -> Result<()> {
        let navigation = self.navigate(location)?;
        print_navigation(&navigation);
        Ok(())
    }

    fn navigate(&self, location: &str) -> Result<Navigation> {
        Ok(self.router.navigate(location, self.store.session())?)
    }

    /// Route to the page a login location asked to come back to. Pages the
    /// router does not know are an error, like with `open`.
    fn resume(&self, location: &str) -> Result<Navigation> {
        let target = resume_target(location);
        debug!(target = %target, "Resuming after login");
        self.navigate(&target)
    }

    /// Show an API failure as a toast and print the server's payload.
    fn report(&mut self, title: &str, error: ApiError) -> anyhow::Error {
        self.toaster.error(title, error.user_message());
        if let Some(payload) = error.payload() {
            if !payload.is_null() {
                match serde_json::to_string_pretty(payload) {
                    Ok(text) => eprintln!("{}", text),
                    Err(e) => warn!(error = %e, "Failed to render error payload"),
                }
            }
        }
        error.into()
    }

    fn remember_username(&mut self, username: String) {
        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    fn prompt_line(label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn prompt_username(last: Option<&str>) -> Result<String> {
        match last {
            Some(last) => {
                let input = Self::prompt_line(&format!("Username [{}]: ", last))?;
                if input.is_empty() {
                    Ok(last.to_string())
                } else {
                    Ok(input)
                }
            }
            None => Self::prompt_line("Username: "),
        }
    }

    fn prompt_password(label: &str) -> Result<String> {
        let password = rpassword::prompt_password(label)?;
        Ok(password)
    }

    fn validate_input(username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(anyhow::anyhow!("Username and password required"));
        }
        if !is_valid_input(username, MAX_USERNAME_LENGTH) {
            return Err(anyhow::anyhow!("Username is too long or contains control characters"));
        }
        if !is_valid_input(password, MAX_PASSWORD_LENGTH) {
            return Err(anyhow::anyhow!("Password is too long or contains control characters"));
        }
        Ok(())
    }
}

fn print_navigation(navigation: &Navigation) {
    if navigation.decision.is_allowed() {
        println!("allow {} {}", navigation.route.name, navigation.full_path);
    } else {
        println!("redirect {}", navigation.location());
    }
}

fn is_valid_input(value: &str, max_len: usize) -> bool {
    value.chars().count() <= max_len && !value.chars().any(char::is_control)
}
