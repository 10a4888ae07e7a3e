use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use chrono::NaiveDate;
use std::sync::Arc;
use tarefas_client::{Client, FileSessionStore, Navigator, ReqwestTransport, TaskPatch};
use tarefas_core::{FilterCriteria, Priority, SortColumn, SystemClock, TaskStatus};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod state;
mod tasks;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "tarefas",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TAREFAS_BUILD_SHA"), ")"),
    about = "Cliente de linha de comando para a API de tarefas"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.tarefas/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Session and account commands
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Task commands (require a valid session)
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    Login {
        #[arg(long)]
        username: Option<String>,
    },
    Logout,
    Status,
    /// Create a new user account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Substring of the task id
    #[arg(long)]
    id: Option<String>,
    /// Case-insensitive substring of title or description
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    status: Option<TaskStatus>,
    /// id, titulo, responsavel, prioridade, status or deadline
    #[arg(long)]
    sort: Option<SortColumn>,
    #[arg(long, requires = "sort")]
    desc: bool,
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    List(ListArgs),
    Show {
        id: u64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD
        #[arg(long, value_parser = tasks::parse_date)]
        deadline: Option<NaiveDate>,
    },
    /// Change fields of a task; omitted fields keep their value
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = tasks::parse_date)]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    Complete {
        id: u64,
    },
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Owners, statuses and priorities accepted by the API
    Options,
}

struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Sessão expirada. Execute: tarefas auth login");
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(cfg: &Config) -> Result<Client> {
    let transport = ReqwestTransport::new(cfg.api.timeout())?;
    let store = FileSessionStore::new(state::session_path()?);
    debug!(base_url = %cfg.api.base_url, session = %store.path().display(), "client configured");
    Ok(Client::new(
        Arc::new(transport),
        store,
        Arc::new(SystemClock),
        Arc::new(CliNavigator),
        cfg.api.endpoints(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.log.filter);

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("# {}\n{}", config::config_path()?.display(), s);
            }
        },

        Command::Auth { command } => {
            let client = build_client(&cfg)?;
            match command {
                AuthCommand::Login { username } => auth::login(&client, username).await?,
                AuthCommand::Logout => auth::logout(&client),
                AuthCommand::Status => auth::status(&client),
                AuthCommand::Register {
                    name,
                    email,
                    username,
                } => auth::register(&client, name, email, username).await?,
            }
        }

        Command::Tasks { command } => {
            let client = build_client(&cfg)?;
            tasks::require_session(&client)?;
            let tz = cfg.client.timezone.as_str();
            match command {
                TasksCommand::List(args) => {
                    let opts = tasks::ListOptions {
                        criteria: FilterCriteria {
                            id_substring: args.id,
                            text_substring: args.text,
                            owner: args.owner,
                            priority: args.priority,
                            status: args.status,
                        },
                        sort: args.sort,
                        descending: args.desc,
                    };
                    tasks::list(&client, tz, opts).await?;
                }
                TasksCommand::Show { id } => tasks::show(&client, id).await?,
                TasksCommand::Create {
                    title,
                    description,
                    owner,
                    priority,
                    deadline,
                } => {
                    let draft = tasks::draft(title, description, owner, priority, deadline);
                    tasks::create(&client, tz, draft).await?;
                }
                TasksCommand::Edit {
                    id,
                    title,
                    description,
                    owner,
                    priority,
                    deadline,
                    status,
                } => {
                    let patch = TaskPatch {
                        title,
                        description,
                        owner,
                        priority,
                        deadline,
                        status,
                    };
                    tasks::edit(&client, tz, id, patch).await?;
                }
                TasksCommand::Complete { id } => tasks::complete(&client, tz, id).await?,
                TasksCommand::Delete { id, yes } => tasks::delete(&client, tz, id, yes).await?,
                TasksCommand::Options => tasks::options(&client).await?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse_into_domain_types() {
        let cli = Cli::try_parse_from([
            "tarefas", "tasks", "list", "--priority", "alta", "--status", "pendente", "--sort",
            "deadline", "--desc",
        ])
        .unwrap();
        let Command::Tasks {
            command: TasksCommand::List(args),
        } = cli.command
        else {
            panic!("expected tasks list");
        };
        assert_eq!(args.priority, Some(Priority::High));
        assert_eq!(args.status, Some(TaskStatus::Pending));
        assert_eq!(args.sort, Some(SortColumn::Deadline));
        assert!(args.desc);
    }

    #[test]
    fn desc_without_sort_is_rejected() {
        assert!(Cli::try_parse_from(["tarefas", "tasks", "list", "--desc"]).is_err());
    }
}
