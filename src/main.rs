use chrono::{Datelike, Month, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use school_desk::{
    auth::{AuthService, Registration, register_operator},
    backend::{Backend, Query, fetch},
    config::settings::{Settings, load_default_settings},
    core::{
        attendance::{attendance_report, sheets_between},
        dashboard::dashboard_summary,
        fee_type::seed_fee_types,
        fees::{collect_fee, dues_list},
        projection::{ClassFilter, StudentFilter, project_students},
        staff::{accrue_monthly_salaries, pay_salary},
        student::delete_student,
    },
    entities::{Student, student},
    errors::{Error, Result},
    session::SessionContext,
    sync::{Screen, embed::EmbedFrame, screens},
};
use sea_orm::EntityTrait;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Console for the school office: students, staff, fees and attendance.
#[derive(Debug, Parser)]
#[command(name = "school-desk", version)]
struct Cli {
    /// Operator email
    #[arg(long, global = true, env = "SCHOOL_DESK_EMAIL")]
    email: Option<String>,
    /// Operator password
    #[arg(long, global = true, env = "SCHOOL_DESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new school account and seed its fee types
    InitAccount {
        #[arg(long)]
        school_name: String,
        #[arg(long)]
        mobile: String,
    },
    /// List students in roll-number order
    Students {
        /// Class name, or "all"
        #[arg(long, default_value = "all")]
        class: String,
        /// Case-insensitive name search
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Students with unpaid months up to a month (1-12, default current)
    Dues {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        through: Option<u8>,
    },
    /// Delete a student and its fee records
    DeleteStudent { id: i64 },
    /// Record a salary payment
    PaySalary {
        staff_id: String,
        amount: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add one month's salary to the dues of active staff
    AccrueSalaries,
    /// Collect a student's fee for a month (1-12)
    CollectFee {
        student_id: i64,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=12))]
        month: u8,
        amount: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Headline figures for the current month
    Dashboard,
    /// Per-roll attendance of a class between two dates
    AttendanceReport {
        class_id: i64,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Print a table every time it changes, until Ctrl-C
    Watch { table: WatchedTable },
    /// Show the configured query helper page
    QueryHelper,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WatchedTable {
    Students,
    Staff,
    Classes,
    Expenses,
    FeeTypes,
    Subjects,
}

fn month_of(number: u8) -> Result<Month> {
    Month::try_from(number).map_err(|_| Error::validation(format!("No month numbered {number}")))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn sign_in(cli: &Cli, backend: &Backend) -> Result<SessionContext> {
    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        return Err(Error::NotSignedIn);
    };
    AuthService::new(backend.clone())
        .sign_in(email, password)
        .await
        .inspect_err(|e| error!("{}", e))
}

async fn watch_screen<E>(screen: Screen<E>) -> Result<()>
where
    E: EntityTrait,
    E::Model: Clone + Send + Sync + Serialize + 'static,
{
    let mut changes = screen.changes();
    loop {
        let state = screen.state().await;
        if let Some(e) = state.error() {
            println!("error: {e}");
        } else {
            print_json(&state.records())?;
        }

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    screen.unmount().await;
    Ok(())
}

async fn watch(
    backend: &Backend,
    session: &SessionContext,
    settings: &Settings,
    table: WatchedTable,
) -> Result<()> {
    let ttl = settings.banner_timeout();
    match table {
        WatchedTable::Students => {
            watch_screen(screens::students(backend, session, ttl).await).await
        }
        WatchedTable::Staff => watch_screen(screens::staff(backend, session, ttl).await).await,
        WatchedTable::Classes => {
            watch_screen(screens::classes(backend, session, ttl).await).await
        }
        WatchedTable::Expenses => {
            watch_screen(screens::expenses(backend, session, ttl).await).await
        }
        WatchedTable::FeeTypes => {
            watch_screen(screens::fee_types(backend, session, ttl).await).await
        }
        WatchedTable::Subjects => {
            watch_screen(screens::subjects(backend, session, ttl).await).await
        }
    }
}

async fn run(cli: Cli, backend: Backend, settings: Settings) -> Result<()> {
    if let Command::InitAccount {
        school_name,
        mobile,
    } = &cli.command
    {
        let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
            return Err(Error::validation("--email and --password are required."));
        };
        let registration = Registration {
            email: email.clone(),
            password: password.clone(),
            school_name: school_name.clone(),
            mobile_number: mobile.clone(),
        };
        register_operator(&backend, &registration).await?;
        let session = sign_in(&cli, &backend).await?;
        let seeded = seed_fee_types(&backend, &session, &settings.fee_types).await?;
        info!("Account ready with {} fee types", seeded);
        println!("Registered {} ({})", session.email, session.uid);
        return Ok(());
    }

    if let Command::QueryHelper = cli.command {
        let url = settings.query_helper_url.as_deref().ok_or_else(|| Error::Config {
            message: "query_helper_url is not set in config.toml".to_string(),
        })?;
        let frame = EmbedFrame::open(url)?;
        println!("{}", frame.src());
        frame.close();
        return Ok(());
    }

    let session = sign_in(&cli, &backend).await?;
    let today = Utc::now().date_naive();

    match cli.command {
        Command::Students { class, search } => {
            let rows = fetch::<Student>(
                &backend,
                &Query::all().filter_eq(student::Column::Uid, session.uid.clone()),
            )
            .await?;
            let filter = StudentFilter {
                search,
                class: ClassFilter::parse(&class),
            };
            for s in project_students(&rows, &filter) {
                println!(
                    "{:>6}  {:<24} {:<6} #{}",
                    s.roll_number.as_deref().unwrap_or("-"),
                    s.name,
                    s.class.as_deref().unwrap_or("-"),
                    s.id
                );
            }
        }
        Command::Dues { through } => {
            let through = match through {
                Some(number) => month_of(number)?,
                None => month_of(u8::try_from(today.month()).unwrap_or(1))?,
            };
            let rows = fetch::<Student>(
                &backend,
                &Query::all().filter_eq(student::Column::Uid, session.uid.clone()),
            )
            .await?;
            for dues in dues_list(&rows, through) {
                let months: Vec<_> = dues.unpaid.iter().map(Month::name).collect();
                println!(
                    "{:<24} {:<6} {}",
                    dues.name,
                    dues.class.as_deref().unwrap_or("-"),
                    months.join(", ")
                );
            }
        }
        Command::DeleteStudent { id } => {
            let fee_records = delete_student(&backend, &session, id).await?;
            println!("Student record deleted successfully ({fee_records} fee records removed).");
        }
        Command::PaySalary {
            staff_id,
            amount,
            notes,
        } => {
            pay_salary(&backend, &session, &staff_id, amount, notes).await?;
            println!("Salary payment recorded successfully.");
        }
        Command::AccrueSalaries => {
            let count = accrue_monthly_salaries(&backend, &session).await?;
            println!("Added one month of salary dues for {count} staff members.");
        }
        Command::CollectFee {
            student_id,
            month,
            amount,
            notes,
        } => {
            let record =
                collect_fee(&backend, &session, student_id, month_of(month)?, amount, notes)
                    .await?;
            print_json(&record)?;
        }
        Command::Dashboard => {
            let summary = dashboard_summary(&backend, &session, today).await?;
            println!("Students:        {}", summary.students);
            println!("Active staff:    {}", summary.active_staff);
            println!("Classes:         {}", summary.classes);
            println!("Fees collected:  {:.2}", summary.fees_collected);
            println!("Expenses:        {:.2}", summary.expenses);
            println!("Salary dues:     {:.2}", summary.salary_dues);
        }
        Command::AttendanceReport { class_id, from, to } => {
            let sheets = sheets_between(&backend, &session, class_id, from, to).await?;
            for row in attendance_report(&sheets) {
                println!(
                    "{:>6}  present {:>3}  absent {:>3}  {:>6.1}%",
                    row.roll_number, row.present_days, row.absent_days, row.percentage
                );
            }
        }
        Command::Watch { table } => watch(&backend, &session, &settings, table).await?,
        Command::InitAccount { .. } | Command::QueryHelper => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load console settings
    let settings = load_default_settings()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;

    // 4. Connect and make sure every table exists
    let backend = Backend::connect()
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    run(cli, backend, settings).await
}
