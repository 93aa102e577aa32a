use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use discourse_client::{Config, DiscourseClient, NewUser, Params, DEFAULT_MEMBERS_LIMIT};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Admin CLI for a Discourse forum
#[derive(Parser, Debug)]
#[command(name = "discourse-cli", version, about, long_about = None)]
struct Args {
    /// Forum root URL
    #[arg(long, env = "DISCOURSE_URL", global = true)]
    url: Option<String>,

    /// Admin API key
    #[arg(long, env = "DISCOURSE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// User the API key acts as (default: system)
    #[arg(long, env = "DISCOURSE_API_USERNAME", global = true)]
    api_username: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Persist the effective URL, key and username to the config file
    #[arg(long, global = true)]
    save_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage groups and their members
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommand),
    /// Read and create topics
    #[command(subcommand)]
    Topic(TopicCommand),
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Find {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    List {
        #[arg(long)]
        parent: Option<String>,
    },
    Create {
        name: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        strict: bool,
        /// Extra payload field, e.g. --field slug=broncos
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    Delete {
        name: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Find {
        name: String,
    },
    List,
    Create {
        name: String,
        #[arg(long)]
        strict: bool,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    Delete {
        name: String,
        #[arg(long)]
        strict: bool,
    },
    /// Add a user by username or email
    AddMember {
        group: String,
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove a user by id, username or email
    RemoveMember {
        group: String,
        #[arg(long, group = "who")]
        id: Option<u64>,
        #[arg(long, group = "who")]
        username: Option<String>,
        #[arg(long, group = "who")]
        email: Option<String>,
    },
    Members {
        group: String,
        #[arg(long, default_value_t = DEFAULT_MEMBERS_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Find {
        #[arg(long, conflicts_with = "username", required_unless_present = "username")]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DISCOURSE_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        external_id: Option<String>,
    },
    Delete {
        email: String,
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TopicCommand {
    List {
        #[arg(long)]
        category_id: Option<u64>,
        #[arg(long, requires = "category_id")]
        parent_category_id: Option<u64>,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    Get {
        id: u64,
    },
    LastPost {
        id: u64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        raw: String,
        #[arg(long)]
        category: String,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}

/// `RUST_LOG` directives when set and valid, otherwise the `--log-level` ceiling
fn log_filter(level: Level, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {log_path:?}: {e}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(tracing_level, rust_log.as_deref()))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("discourse-cli started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("discourse-client").join("discourse-client.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".discourse-client").join("discourse-client.log");
    }
    PathBuf::from("discourse-client.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_optional<T: Serialize>(value: Option<T>, none_message: &str) -> Result<()> {
    match value {
        Some(value) => print_json(&value),
        None => {
            println!("{none_message}");
            Ok(())
        }
    }
}

fn to_params(fields: Vec<(String, String)>) -> Params {
    fields.into_iter().collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load().merge(
        args.url.clone(),
        args.api_key.clone(),
        args.api_username.clone(),
    );
    let client_config = config
        .to_client_config()
        .context("Set --url and --api-key (or DISCOURSE_URL / DISCOURSE_API_KEY)")?;

    if args.save_config {
        config.save().context("Failed to save config")?;
    }

    tracing::info!(
        "Using {} as {}",
        client_config.base_url(),
        client_config.api_username()
    );

    let client = DiscourseClient::new(client_config).context("Failed to create HTTP client")?;

    run(&client, args.command).await
}

async fn run(client: &DiscourseClient, command: Command) -> Result<()> {
    match command {
        Command::Category(cmd) => run_category(client, cmd).await,
        Command::Group(cmd) => run_group(client, cmd).await,
        Command::User(cmd) => run_user(client, cmd).await,
        Command::Topic(cmd) => run_topic(client, cmd).await,
    }
}

async fn run_category(client: &DiscourseClient, cmd: CategoryCommand) -> Result<()> {
    let categories = &client.categories;
    match cmd {
        CategoryCommand::Find { name, parent } => {
            let found = categories.find_by_name(&name, parent.as_deref()).await?;
            print_optional(found, "No such category")
        }
        CategoryCommand::List { parent } => print_json(&categories.list(parent.as_deref()).await?),
        CategoryCommand::Create {
            name,
            parent,
            strict,
            fields,
        } => {
            let created = categories
                .create(&name, parent.as_deref(), strict, &to_params(fields))
                .await?;
            print_optional(created, "Category already exists, nothing created")
        }
        CategoryCommand::Delete {
            name,
            parent,
            strict,
        } => {
            let deleted = categories.delete(&name, parent.as_deref(), strict).await?;
            print_optional(deleted, "Category not found, nothing deleted")
        }
    }
}

async fn run_group(client: &DiscourseClient, cmd: GroupCommand) -> Result<()> {
    let groups = &client.groups;
    match cmd {
        GroupCommand::Find { name } => print_optional(groups.find_by_name(&name).await?, "No such group"),
        GroupCommand::List => print_json(&groups.list().await?),
        GroupCommand::Create {
            name,
            strict,
            fields,
        } => {
            let created = groups.create(&name, strict, &to_params(fields)).await?;
            print_optional(created, "Group already exists, nothing created")
        }
        GroupCommand::Delete { name, strict } => {
            let deleted = groups.delete(&name, strict).await?;
            print_optional(deleted, "Group not found, nothing deleted")
        }
        GroupCommand::AddMember {
            group,
            username,
            email,
        } => {
            let result = match (username, email) {
                (Some(username), _) => groups.add_member_by_username(&username, &group).await?,
                (None, Some(email)) => groups.add_member_by_email(&email, &group).await?,
                (None, None) => anyhow::bail!("either --username or --email is required"),
            };
            print_json(&result)
        }
        GroupCommand::RemoveMember {
            group,
            id,
            username,
            email,
        } => {
            let result = match (id, username, email) {
                (Some(id), _, _) => groups.remove_member_by_id(id, &group).await?,
                (None, Some(username), _) => {
                    groups.remove_member_by_username(&username, &group).await?
                }
                (None, None, Some(email)) => groups.remove_member_by_email(&email, &group).await?,
                (None, None, None) => anyhow::bail!("one of --id, --username or --email is required"),
            };
            print_json(&result)
        }
        GroupCommand::Members {
            group,
            limit,
            offset,
        } => print_json(&groups.get_members(&group, limit, offset).await?),
    }
}

async fn run_user(client: &DiscourseClient, cmd: UserCommand) -> Result<()> {
    let users = &client.users;
    match cmd {
        UserCommand::Find { email, username } => {
            let found = match (email, username) {
                (Some(email), _) => users.find_by_email(&email).await?,
                (None, Some(username)) => users.find_by_username(&username).await?,
                (None, None) => anyhow::bail!("either --email or --username is required"),
            };
            print_optional(found, "No such user")
        }
        UserCommand::Create {
            name,
            email,
            password,
            username,
            external_id,
        } => {
            let new_user = NewUser {
                name,
                email,
                password,
                username,
                external_id,
            };
            print_json(&users.create(&new_user).await?)
        }
        UserCommand::Delete { email, strict } => {
            let deleted = users.delete(&email, strict).await?;
            print_optional(deleted, "User not found, nothing deleted")
        }
    }
}

async fn run_topic(client: &DiscourseClient, cmd: TopicCommand) -> Result<()> {
    let content = &client.content;
    match cmd {
        TopicCommand::List {
            category_id,
            parent_category_id,
            page,
        } => print_json(&content.list_topics(category_id, parent_category_id, page).await?),
        TopicCommand::Get { id } => print_json(&content.get_topic(id).await?),
        TopicCommand::LastPost { id } => print_json(&content.get_topic_last_post(id).await?),
        TopicCommand::Create {
            title,
            raw,
            category,
            fields,
        } => {
            let created = content
                .create_topic(&title, &raw, &category, &to_params(fields))
                .await?;
            print_json(&created)
        }
    }
}
