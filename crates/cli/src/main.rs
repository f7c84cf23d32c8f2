use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use healthtrends_client::refresh::refresh_after;
use healthtrends_client::views::{AdminView, DoctorView, LabView, PatientView, Status};
use healthtrends_client::{CognitoIdentity, HealthTrendsClient, SessionProvider, SessionStore};
use healthtrends_core::search::SearchField;
use healthtrends_core::{DateRange, Screen};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod prompt;
mod render;
mod settings;

use prompt::TerminalConfirmer;
use settings::Settings;

#[derive(Parser)]
#[command(name = "healthtrends")]
#[command(about = "HealthTrends lab results dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Username or email
        username: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove the stored session
    Logout,
    /// Show the current session and home screen
    Whoami,
    /// List or search patients
    Patients {
        /// Case-insensitive search text
        #[arg(long)]
        search: Option<String>,
        /// Field to search
        #[arg(long, value_enum, default_value_t = SearchBy::Name)]
        by: SearchBy,
    },
    /// Show a patient's trends with risk analysis
    Trends {
        /// Patient id
        patient_id: String,
        #[command(flatten)]
        view: TrendArgs,
    },
    /// Show your own trends
    MyTrends {
        #[command(flatten)]
        view: TrendArgs,
    },
    /// Send your profile after sign-up
    Profile {
        /// Full name
        #[arg(long)]
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: String,
        /// Gender
        #[arg(long)]
        gender: String,
    },
    /// Laboratory operations
    #[command(subcommand)]
    Lab(LabCommands),
    /// Test catalog operations
    #[command(subcommand)]
    Catalog(CatalogCommands),
    /// Administration
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Args)]
struct TrendArgs {
    /// Test code (defaults to the first available test)
    #[arg(long)]
    test: Option<String>,
    /// Range start (YYYY-MM-DD, defaults to a year before the end)
    #[arg(long)]
    from: Option<String>,
    /// Range end (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    to: Option<String>,
}

#[derive(Subcommand)]
enum LabCommands {
    /// Submit one result to the ingestion pipeline
    Ingest {
        patient_id: String,
        test_code: String,
        value: f64,
        /// When the sample was taken (defaults to now)
        #[arg(long)]
        date: Option<String>,
        /// Wait for processing and show the refreshed history
        #[arg(long)]
        wait: bool,
    },
    /// Upload a JSON array of results; the whole file is rejected if any row is invalid
    Upload {
        /// Path to the JSON file
        file: std::path::PathBuf,
    },
    /// Delete a patient's results for one test within a date range
    DeleteResults {
        patient_id: String,
        test_code: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List catalog tests
    List,
    /// Add a catalog test
    Add {
        code: String,
        name: String,
        unit: String,
    },
    /// Delete a catalog test
    Delete {
        code: String,
        /// Answer yes to every confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Add catalog entries for codes found only in results
    Sync,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Put a user into a role group
    AssignRole {
        email: String,
        /// admin, lab, doctor or patient
        role: String,
    },
    /// Delete a patient record or account
    DeletePatient {
        patient_id: String,
        /// Answer yes to every confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchBy {
    Name,
    Id,
}

impl From<SearchBy> for SearchField {
    fn from(by: SearchBy) -> Self {
        match by {
            SearchBy::Name => SearchField::Name,
            SearchBy::Id => SearchField::Id,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("healthtrends=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let today = Local::now().date_naive();

    let Some(command) = cli.command else {
        println!("Use 'healthtrends --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Login { username, password } => login(&settings, &username, password).await,
        Commands::Logout => {
            let store = SessionStore::new(settings.session_file().clone());
            if store.clear()? {
                println!("Logged out.");
            } else {
                println!("No session to remove.");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Whoami => {
            let provider = SessionProvider::new(
                SessionStore::new(settings.session_file().clone()),
                settings.token_override().map(str::to_string),
            );
            match provider.current() {
                Ok(session) => {
                    println!("User:    {}", session.subject_id());
                    if let Some(email) = session.email() {
                        println!("Email:   {email}");
                    }
                    println!("Role:    {}", session.role());
                    println!("Screen:  {:?}", Screen::for_session(Some(&session)));
                    if let Some(exp) = session.expires_at() {
                        println!("Expires: {}", exp.with_timezone(&Local));
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", e.status_line());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Patients { search, by } => {
            let client = connect(&settings)?;
            let mut view = DoctorView::new(today);
            view.load_patients(&client).await;
            if let Some(query) = search {
                render::patients(view.search(&query, by.into()));
            } else {
                render::patients(view.patients());
            }
            Ok(finish(view.status()))
        }
        Commands::Trends { patient_id, view: args } => {
            let client = connect(&settings)?;
            let mut view = DoctorView::new(today);
            view.trends_mut().set_range(range_from(&args, today)?);
            view.select_patient(&client, &patient_id).await;
            if view.status().is_none() {
                if let Some(code) = &args.test {
                    select_test(view.trends_mut(), code)?;
                }
                view.load_trends(&client).await;
            }
            render::trend_panel(view.trends());
            Ok(finish(view.status()))
        }
        Commands::MyTrends { view: args } => {
            let client = connect(&settings)?;
            let mut view = patient_view(&client, today)?;
            view.trends_mut().set_range(range_from(&args, today)?);
            view.load_tests(&client).await;
            if !view.trends().tests().is_empty() {
                if let Some(code) = &args.test {
                    select_test(view.trends_mut(), code)?;
                }
                view.load_trends(&client).await;
            }
            render::trend_panel(view.trends());
            Ok(finish(view.status()))
        }
        Commands::Profile { name, dob, gender } => {
            let client = connect(&settings)?;
            let dob = NaiveDate::parse_from_str(&dob, "%Y-%m-%d")
                .with_context(|| format!("date of birth is not YYYY-MM-DD: {dob}"))?;
            let mut view = patient_view(&client, today)?;
            view.sync_profile(&client, &name, dob, &gender).await;
            Ok(finish(view.status()))
        }
        Commands::Lab(cmd) => lab(&settings, cmd, today).await,
        Commands::Catalog(cmd) => catalog(&settings, cmd).await,
        Commands::Admin(cmd) => admin(&settings, cmd).await,
    }
}

async fn login(
    settings: &Settings,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<ExitCode> {
    let password = match password {
        Some(p) => p,
        None => prompt::ask("Password: ").context("failed to read password")?,
    };

    let identity = CognitoIdentity::from_config(settings.identity())?;
    let stored = identity.sign_in(username, &password).await?;

    let store = SessionStore::new(settings.session_file().clone());
    store.save(&stored)?;

    let provider = SessionProvider::new(store, None);
    let screen = provider.screen();
    if screen == Screen::Entry {
        eprintln!("Logged in, but this account has no role yet. Ask an administrator.");
        return Ok(ExitCode::FAILURE);
    }
    println!("Logged in. Home screen: {screen:?}");
    Ok(ExitCode::SUCCESS)
}

async fn lab(settings: &Settings, cmd: LabCommands, today: NaiveDate) -> anyhow::Result<ExitCode> {
    let client = connect(settings)?;
    let mut view = LabView::new();

    match cmd {
        LabCommands::Ingest {
            patient_id,
            test_code,
            value,
            date,
            wait,
        } => {
            view.load_catalog(&client).await;
            let date = date.unwrap_or_else(|| {
                Local::now()
                    .naive_local()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            });
            let sent = view
                .submit(&client, &patient_id, &test_code, value, &date)
                .await;
            print_status(view.status());

            if let (Some(sent), true) = (sent, wait) {
                let range = DateRange::default_ending(today);
                let history = refresh_after(client.refresh_delay(), || {
                    client.trend_history(sent.patient_id.as_str(), sent.test_code.as_str(), &range)
                })
                .await;
                match history {
                    Ok(history) => render::history(&history),
                    Err(e) => {
                        eprintln!("{}", e.status_line());
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            Ok(exit_code(view.status()))
        }
        LabCommands::Upload { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            view.upload(&client, &json).await;
            for problem in view.rejected_rows() {
                eprintln!("  {problem}");
            }
            Ok(finish(view.status()))
        }
        LabCommands::DeleteResults {
            patient_id,
            test_code,
            from,
            to,
        } => {
            let range = DateRange::from_bounds(Some(&from), Some(&to), today)?;
            view.delete_results(&client, &patient_id, &test_code, &range)
                .await;
            Ok(finish(view.status()))
        }
    }
}

async fn catalog(settings: &Settings, cmd: CatalogCommands) -> anyhow::Result<ExitCode> {
    let client = connect(settings)?;
    let mut view = AdminView::new();

    match cmd {
        CatalogCommands::List => {
            view.load_catalog(&client).await;
            render::catalog(view.catalog());
        }
        CatalogCommands::Add { code, name, unit } => {
            view.create_catalog_entry(&client, &code, &name, &unit)
                .await;
        }
        CatalogCommands::Delete { code, yes } => {
            view.load_catalog(&client).await;
            if view.status().is_none() {
                let mut confirmer = TerminalConfirmer::new(yes);
                view.delete_catalog_entry(&client, &code, &mut confirmer)
                    .await;
            }
        }
        CatalogCommands::Sync => {
            view.sync_catalog(&client).await;
            render::catalog(view.catalog());
        }
    }
    Ok(finish(view.status()))
}

async fn admin(settings: &Settings, cmd: AdminCommands) -> anyhow::Result<ExitCode> {
    let client = connect(settings)?;
    let mut view = AdminView::new();

    match cmd {
        AdminCommands::AssignRole { email, role } => {
            view.assign_role(&client, &email, &role).await;
        }
        AdminCommands::DeletePatient { patient_id, yes } => {
            view.load_patients(&client).await;
            if view.status().is_none() {
                let mut confirmer = TerminalConfirmer::new(yes);
                view.delete_patient(&client, &patient_id, &mut confirmer)
                    .await;
            }
        }
    }
    Ok(finish(view.status()))
}

// ============================================================================
// Helpers
// ============================================================================

fn connect(settings: &Settings) -> anyhow::Result<HealthTrendsClient> {
    let cfg = settings.client_config()?;
    let client = HealthTrendsClient::new(&cfg)?;
    tracing::debug!("using read service {}", cfg.read_url());
    Ok(client)
}

fn patient_view(client: &HealthTrendsClient, today: NaiveDate) -> anyhow::Result<PatientView> {
    PatientView::for_current_user(client, today).map_err(|e| anyhow::anyhow!(e.status_line()))
}

fn range_from(args: &TrendArgs, today: NaiveDate) -> anyhow::Result<DateRange> {
    Ok(DateRange::from_bounds(
        args.from.as_deref(),
        args.to.as_deref(),
        today,
    )?)
}

fn select_test(
    panel: &mut healthtrends_client::views::TrendPanel,
    code: &str,
) -> anyhow::Result<()> {
    if !panel.select(code) {
        anyhow::bail!("no results on file for test {code}");
    }
    Ok(())
}

fn print_status(status: Option<&Status>) {
    match status {
        Some(s) if s.is_error() => eprintln!("{s}"),
        Some(s) => println!("{s}"),
        None => {}
    }
}

fn exit_code(status: Option<&Status>) -> ExitCode {
    if status.is_some_and(Status::is_error) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Print the view's status line and turn it into the process exit code.
fn finish(status: Option<&Status>) -> ExitCode {
    print_status(status);
    exit_code(status)
}
