use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "devops-pusher")]
#[command(about = "Generate work items with AI and push them to Azure DevOps", version)]
#[command(after_help = "EXAMPLES:
    devops-pusher serve                          Run the dashboard API
    devops-pusher generate \"Login page with SSO\"  Generate work items
    devops-pusher push items.json                Create work items in Azure DevOps
    devops-pusher session create --user alice    Issue an API token")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Show the full error chain on failure
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    #[command(after_help = "EXAMPLES:
    devops-pusher serve
    devops-pusher serve --bind 0.0.0.0:8080 --db ./pusher.db")]
    Serve(ServeArgs),
    /// Generate work items from a prompt
    #[command(after_help = "EXAMPLES:
    devops-pusher generate \"Checkout flow for the web shop\"
    devops-pusher generate \"Fix flaky CI\" --model openai/gpt-4 --out items.json")]
    Generate(GenerateArgs),
    /// Create work items in Azure DevOps from a JSON file
    #[command(after_help = "EXAMPLES:
    devops-pusher push items.json
    cat items.json | devops-pusher push - --org contoso --project web")]
    Push(PushArgs),
    /// Show or change stored per-user settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Manage API session tokens
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// List the models available for generation
    Models,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    devops-pusher completions bash > ~/.bash_completion.d/devops-pusher
    devops-pusher completions zsh > ~/.zfunc/_devops-pusher")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on (default: 127.0.0.1:3000)
    #[arg(long)]
    pub bind: Option<String>,

    /// SQLite database for settings and sessions
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// What the work items should cover
    pub prompt: String,

    /// Model identifier (e.g., anthropic/claude-3.5-sonnet)
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenRouter API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Read stored settings for this user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Also write the generated items to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct PushArgs {
    /// JSON file with a work item array, or - for stdin
    pub file: PathBuf,

    /// Azure DevOps organization
    #[arg(long)]
    pub org: Option<String>,

    /// Azure DevOps project
    #[arg(long)]
    pub project: Option<String>,

    /// Personal access token
    #[arg(long)]
    pub pat: Option<String>,

    /// Read stored settings for this user
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show a user's settings
    Show {
        #[arg(short, long)]
        user: String,
    },
    /// Update a user's settings; omitted fields keep their value
    Set(SettingsSetArgs),
}

#[derive(Args, Clone)]
pub struct SettingsSetArgs {
    #[arg(short, long)]
    pub user: String,

    #[arg(long)]
    pub openrouter_key: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub org: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub pat: Option<String>,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Issue a bearer token for a user
    Create {
        #[arg(short, long)]
        user: String,
    },
    /// Revoke a bearer token
    Revoke {
        token: String,
    },
}
