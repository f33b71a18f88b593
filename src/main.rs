use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use trivia_trek::admin::{Catalog, DeletePolicy, QuestionSetForm};
use trivia_trek::analytics::{self, AttemptFilter, Lookups, MOST_MISSED_LIMIT};
use trivia_trek::auth::{AuthSession, FileSessionStore, GoogleProfile, RolePolicy, Signup};
use trivia_trek::config::{self, Config};
use trivia_trek::models::{NewSubcategory, QuestionSet};
use trivia_trek::quiz::{QuestionLoader, Target};
use trivia_trek::store::{AnyStore, DataStore, MemoryStore, QuestionSetQuery, RestStore};
use trivia_trek::trivia::{BackupFile, OpenTdbClient};
use trivia_trek::ui::LeaderboardView;
use trivia_trek::{data, logging, tui};

type Session = AuthSession<AnyStore, FileSessionStore>;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the REST data store
    #[arg(long, env = "TRIVIA_STORE_URL", default_value = config::DEFAULT_STORE_URL, global = true)]
    store_url: String,

    /// OpenTDB-compatible question endpoint
    #[arg(long, env = "TRIVIA_API_URL", default_value = config::DEFAULT_TRIVIA_URL, global = true)]
    trivia_url: String,

    /// JSON list of backup questions
    #[arg(long, env = "TRIVIA_BACKUP_FILE", default_value = config::DEFAULT_BACKUP_FILE, global = true)]
    backup_file: PathBuf,

    /// Use this db.json in memory instead of the REST store
    #[arg(long, env = "TRIVIA_OFFLINE_DB", global = true)]
    offline_db: Option<PathBuf>,

    #[arg(long, env = "TRIVIA_SESSION_FILE", default_value = config::DEFAULT_SESSION_FILE, global = true)]
    session_file: PathBuf,

    #[arg(long, env = "TRIVIA_LOG_FILE", default_value = config::DEFAULT_LOG_FILE, global = true)]
    log_file: PathBuf,

    /// Seconds allowed per question
    #[arg(long, env = "TRIVIA_SECONDS_PER_QUESTION", default_value_t = config::DEFAULT_SECONDS_PER_QUESTION, global = true)]
    seconds_per_question: u32,

    /// Questions requested from the trivia API
    #[arg(long, env = "TRIVIA_QUESTION_AMOUNT", default_value_t = config::DEFAULT_QUESTION_AMOUNT, global = true)]
    question_amount: u32,

    /// Delay before a quiz fetch starts, in milliseconds
    #[arg(long, env = "TRIVIA_DEBOUNCE_MS", default_value_t = config::DEFAULT_DEBOUNCE.as_millis() as u64, global = true)]
    debounce_ms: u64,

    #[arg(long, env = "TRIVIA_ROLE_POLICY", value_enum, default_value_t = RolePolicy::Explicit, global = true)]
    role_policy: RolePolicy,

    #[arg(long, env = "TRIVIA_DELETE_POLICY", value_enum, default_value_t = DeletePolicy::Permissive, global = true)]
    delete_policy: DeletePolicy,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            store_url: self.store_url.clone(),
            trivia_url: self.trivia_url.clone(),
            backup_file: Some(self.backup_file.clone()),
            offline_db: self.offline_db.clone(),
            session_file: self.session_file.clone(),
            log_file: self.log_file.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            seconds_per_question: self.seconds_per_question,
            question_amount: self.question_amount,
            role_policy: self.role_policy,
            delete_policy: self.delete_policy,
            ..Config::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a quiz. TARGET is an OpenTDB category id or `local-<subcategory id>`
    Play {
        target: String,
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Rank players by best accuracy
    Leaderboard {
        #[arg(short, long)]
        level: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Print JSON instead of opening the terminal view
        #[arg(long)]
        json: bool,
    },
    /// Admin reports as JSON
    Report {
        #[arg(short, long, default_value = analytics::ALL)]
        level: String,
    },
    /// Admin dashboard summary as JSON
    Dashboard,
    /// Your own attempts and totals as JSON
    Profile,
    Login {
        email: String,
        #[arg(long, env = "TRIVIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        name: String,
        email: String,
        #[arg(long, env = "TRIVIA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Log in with a Google ID token
    GoogleLogin { token: String },
    Logout,
    Whoami,
    /// Manage the catalog (admin only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    Categories {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    AddCategory { name: String },
    RenameCategory { id: String, name: String },
    DeleteCategory { id: String },
    Subcategories {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    AddSubcategory {
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, default_value = "")]
        color: String,
    },
    DeleteSubcategory { id: String },
    Sets {
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Add a question set from a JSON file
    ImportSet { file: PathBuf },
    /// Replace a question set with the contents of a JSON file
    UpdateSet { id: String, file: PathBuf },
    DeleteSet { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config();

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("Could not open log file {}: {}", config.log_file.display(), e);
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn open_store(config: &Config) -> Result<AnyStore, Box<dyn Error>> {
    Ok(match &config.offline_db {
        Some(path) => AnyStore::Memory(MemoryStore::open(path).await?),
        None => AnyStore::Rest(RestStore::new(&config.store_url, config.request_timeout)?),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, config: Config) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(open_store(&config).await?);
    let mut auth: Session = AuthSession::new(
        store.clone(),
        FileSessionStore::new(&config.session_file),
        config.role_policy,
    );
    auth.init().await;

    match command {
        Command::Play { target, level } => {
            let target = Target::parse(&target, level.as_deref())?;
            let loader = QuestionLoader::new(
                store.clone(),
                OpenTdbClient::new(&config.trivia_url, config.request_timeout)?,
                BackupFile::new(config.backup_file.clone(), config.backup_timeout),
                StdRng::from_entropy(),
                config.sourcing(),
            );
            let user = auth.user().cloned();
            if let Some(attempt) = tui::run_quiz(Arc::new(loader), store.clone(), target, user, &config).await? {
                println!("Scored {}/{} in {}s", attempt.score, attempt.total_questions, attempt.duration_seconds);
            }
        }
        Command::Leaderboard { level, category, json } => {
            let (attempts, categories, subcategories) =
                futures_util::try_join!(store.attempts(), store.categories(), store.subcategories(None))?;
            let filter = AttemptFilter {
                level: level.clone(),
                category: category.clone(),
            };
            let filtered = filter.apply(&attempts);
            let rows = analytics::leaderboard_ranking(&filtered);
            if json {
                return print_json(&rows);
            }
            let view = LeaderboardView {
                recent: analytics::recent_activity(&filtered, 10),
                rows,
                lookups: Lookups::new(&categories, &subcategories),
                filter_label: format!(
                    "level: {}  ·  category: {}",
                    level.as_deref().unwrap_or(analytics::ALL),
                    category.as_deref().unwrap_or(analytics::ALL)
                ),
                scroll: 0,
            };
            tui::run_leaderboard(view)?;
        }
        Command::Report { level } => {
            require_admin(&auth)?;
            let data = analytics::load_dashboard(&*store).await?;
            let attempts = analytics::filter_by_level(&data.attempts, &level);
            let lookups = Lookups::new(&data.categories, &data.subcategories);
            print_json(&serde_json::json!({
                "level": level,
                "dashboard": analytics::dashboard_summary(&data),
                "quizWise": analytics::quiz_wise_report(&attempts, &lookups),
                "userWise": analytics::user_wise_report(&attempts),
                "difficulty": analytics::difficulty_analytics(&attempts),
                "mostMissed": analytics::most_missed_questions(&attempts, MOST_MISSED_LIMIT),
                "recent": analytics::recent_activity(&attempts, 10),
            }))?;
        }
        Command::Dashboard => {
            require_admin(&auth)?;
            let data = analytics::load_dashboard(&*store).await?;
            print_json(&analytics::dashboard_summary(&data))?;
        }
        Command::Profile => {
            let user = auth.user().ok_or("Please log in to view your profile")?;
            let attempts = analytics::profile_attempts(&store.attempts().await?, user);
            print_json(&serde_json::json!({
                "user": { "name": user.name, "email": user.email, "role": auth.role() },
                "stats": analytics::profile_stats(&attempts),
                "attempts": attempts,
            }))?;
        }
        Command::Login { email, password } => {
            let user = auth.login(&email, &password).await?;
            println!("Logged in as {} ({:?})", user.name, auth.role().unwrap_or_default());
        }
        Command::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let user = auth
                .signup(Signup {
                    name,
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            println!("Welcome, {}!", user.name);
        }
        Command::GoogleLogin { token } => {
            let user = auth.google_login(GoogleProfile::from_id_token(&token)?).await?;
            println!("Logged in as {} ({:?})", user.name, auth.role().unwrap_or_default());
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => match auth.user() {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, auth.role().unwrap_or_default()),
            None => println!("Not logged in"),
        },
        Command::Admin(cmd) => {
            require_admin(&auth)?;
            run_admin(cmd, Catalog::new(store, config.delete_policy)).await?;
        }
    }
    Ok(())
}

fn require_admin(auth: &Session) -> Result<(), Box<dyn Error>> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err("This command requires an admin account".into())
    }
}

fn parse_level(level: Option<&str>) -> Result<Option<trivia_trek::models::Level>, Box<dyn Error>> {
    Ok(level.map(str::parse).transpose()?)
}

async fn run_admin(cmd: AdminCommand, catalog: Catalog<AnyStore>) -> Result<(), Box<dyn Error>> {
    match cmd {
        AdminCommand::Categories { search } => print_json(&catalog.categories(&search).await?)?,
        AdminCommand::AddCategory { name } => print_json(&catalog.add_category(&name).await?)?,
        AdminCommand::RenameCategory { id, name } => catalog.rename_category(&id, &name).await?,
        AdminCommand::DeleteCategory { id } => catalog.delete_category(&id).await?,
        AdminCommand::Subcategories { category, search } => {
            print_json(&catalog.subcategories(category.as_deref(), &search).await?)?
        }
        AdminCommand::AddSubcategory {
            name,
            category,
            image_url,
            color,
        } => {
            let form = NewSubcategory {
                name,
                category_id: category,
                image_url,
                color,
            };
            print_json(&catalog.add_subcategory(&form).await?)?
        }
        AdminCommand::DeleteSubcategory { id } => catalog.delete_subcategory(&id).await?,
        AdminCommand::Sets { subcategory, level } => {
            let query = QuestionSetQuery {
                sub_category_id: subcategory.as_deref(),
                level: parse_level(level.as_deref())?,
            };
            print_json(&catalog.question_sets(query).await?)?
        }
        AdminCommand::ImportSet { file } => {
            let set: QuestionSet = data::load_json(&file).await?;
            let form = QuestionSetForm {
                category_id: set.category_id,
                sub_category_id: set.sub_category_id,
                level: Some(set.level),
                questions: set.questions,
            };
            print_json(&catalog.add_question_set(&form).await?)?
        }
        AdminCommand::UpdateSet { id, file } => {
            let set: QuestionSet = data::load_json(&file).await?;
            print_json(&catalog.update_question_set(&id, &set).await?)?
        }
        AdminCommand::DeleteSet { id } => catalog.delete_question_set(&id).await?,
    }
    Ok(())
}
