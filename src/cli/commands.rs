use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use crate::backend::{JobBackend, SqliteBackend};
use crate::cli::error::{parse_amount, parse_job_id_list, parse_key_values, validate_job_id, validate_non_empty, validate_status_code};
use crate::cli::output::{
    format_bulk_report, format_catalog_issues, format_history, format_job_summary, format_job_table,
    format_pagination, format_status_list, get_terminal_width, is_tty, TableLookups,
};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::db::DbConnection;
use crate::error::JobError;
use crate::models::{is_hex_color, NewJob, PaymentChannel, SystemType, User};
use crate::repo::{ChannelRepo, HistoryRepo, StatusRepo, UserRepo, ViewRepo};
use crate::utils::{fuzzy, parse_date_expr};
use crate::view::{BulkTarget, JobTable, ListViewState, TableAction};
use crate::workflow::{Actor, BulkAction, Direction, StatusCatalog};
use anyhow::{Context, Result};

/// Saved views are stored per entity; jobs are the only listed entity
const VIEW_ENTITY: &str = "jobs";

#[derive(Parser)]
#[command(name = "jobdesk")]
#[command(about = "Job desk - job status workflow, table views and bulk operations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new job
    Add(AddArgs),
    /// List jobs (filters, sort and paging as KEY=VALUE, e.g. "status=todo,review sort=dueAt:asc")
    List {
        /// List state keys (page, limit, sort, search, tab, columns, filters)
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Start from a saved view
        #[arg(long)]
        view: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show details of a job
    Show {
        /// Job ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Move a job to the next status
    Next {
        /// Job ID
        id: String,
    },
    /// Move a job to the previous status
    Prev {
        /// Job ID
        id: String,
    },
    /// Move a job to a status
    Move {
        /// Job ID
        id: String,
        /// Target status code
        code: String,
        /// Force change to any status (admin only)
        #[arg(long)]
        force: bool,
    },
    /// Show the statuses a job can move to
    Targets {
        /// Job ID
        id: String,
    },
    /// Mark a job as paid
    Pay {
        /// Job ID
        id: String,
        /// Mark as unpaid instead
        #[arg(long)]
        unpaid: bool,
    },
    /// Change a job's due date
    Reschedule {
        /// Job ID
        id: String,
        /// New due date (YYYY-MM-DD, today, tomorrow, +Nd) or "none"
        date: String,
    },
    /// Assign a user to a job
    Assign {
        /// Job ID
        id: String,
        /// User name or ID
        user: String,
    },
    /// Show the status history of a job
    History {
        /// Job ID
        id: String,
    },
    /// Apply an action to many jobs
    Bulk {
        #[command(subcommand)]
        subcommand: BulkCommands,
    },
    /// Status catalog commands
    Statuses {
        #[command(subcommand)]
        subcommand: StatusCommands,
    },
    /// User commands
    Users {
        #[command(subcommand)]
        subcommand: UserCommands,
    },
    /// Payment channel commands
    Channels {
        #[command(subcommand)]
        subcommand: ChannelCommands,
    },
    /// Saved list view commands
    Views {
        #[command(subcommand)]
        subcommand: ViewCommands,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Job display name
    pub name: String,
    /// Client name
    #[arg(long)]
    pub client: String,
    /// Income amount
    #[arg(long)]
    pub income: Option<String>,
    /// Staff cost amount
    #[arg(long = "staff-cost")]
    pub staff_cost: Option<String>,
    /// Job number (generated when omitted)
    #[arg(long)]
    pub number: Option<String>,
    /// Job type code
    #[arg(long = "type")]
    pub job_type: Option<String>,
    /// Due date (YYYY-MM-DD, today, tomorrow, +Nd)
    #[arg(long)]
    pub due: Option<String>,
    /// Payment channel name or ID
    #[arg(long)]
    pub channel: Option<String>,
    /// Assignee name or ID (repeatable)
    #[arg(long = "assign")]
    pub assignees: Vec<String>,
    /// Attachment URL (repeatable)
    #[arg(long = "attach")]
    pub attachments: Vec<String>,
    /// Initial status code
    #[arg(long)]
    pub status: Option<String>,
}

/// Which jobs a bulk action applies to
#[derive(Args)]
pub struct BulkSelection {
    /// Every job matching the list keys (and --view)
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
    /// With --all: job IDs to leave out
    #[arg(long, requires = "all")]
    pub except: Option<String>,
    /// Job IDs, e.g. 1,4-6
    #[arg(long)]
    pub ids: Option<String>,
    /// With --all: start from a saved view
    #[arg(long, requires = "all")]
    pub view: Option<String>,
    /// List state keys narrowing --all
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

#[derive(Subcommand)]
pub enum BulkCommands {
    /// Move jobs to a status (force change for admins, quick change for staff)
    Status {
        /// Target status code
        code: String,
        #[command(flatten)]
        selection: BulkSelection,
    },
    /// Mark jobs as paid
    Pay {
        /// Mark as unpaid instead
        #[arg(long)]
        unpaid: bool,
        #[command(flatten)]
        selection: BulkSelection,
    },
    /// Assign a user to jobs
    Assign {
        /// User name or ID
        user: String,
        #[command(flatten)]
        selection: BulkSelection,
    },
}

#[derive(Subcommand)]
pub enum StatusCommands {
    /// List statuses in workflow order
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Add a status to the catalog
    Add {
        /// Status code
        code: String,
        /// Display name
        name: String,
        /// Position in the workflow order
        #[arg(long)]
        order: i64,
        /// Order of the previous status (its next link is repointed)
        #[arg(long)]
        prev: Option<i64>,
        /// Order of the next status (its prev link is repointed)
        #[arg(long)]
        next: Option<i64>,
        /// Color as #rrggbb
        #[arg(long, default_value = "#888888")]
        color: String,
        /// System type: STANDARD, WAIT_REVIEW, COMPLETED or TERMINATED
        #[arg(long = "type", default_value = "STANDARD")]
        system_type: String,
    },
    /// Check the catalog for broken links, duplicate orders and bad colors
    Check,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// User name
        name: String,
    },
    /// List users
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ChannelCommands {
    /// Create a payment channel
    Add {
        /// Channel name
        name: String,
    },
    /// List payment channels
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ViewCommands {
    /// Save list state keys under a name
    Save {
        /// View name
        name: String,
        /// List state keys
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// List saved views
    List,
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                e.print()?;
                return Ok(());
            }
            let rendered = e.render().to_string();
            anyhow::bail!("{}", rendered.trim_start_matches("error: ").trim_end());
        }
    };
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add(args) => handle_add(args),
        Commands::List { params, view, json } => handle_list(params, view, json),
        Commands::Show { id, json } => handle_show(&id, json),
        Commands::Next { id } => handle_step(&id, Direction::Next),
        Commands::Prev { id } => handle_step(&id, Direction::Prev),
        Commands::Move { id, code, force } => handle_move(&id, &code, force),
        Commands::Targets { id } => handle_targets(&id),
        Commands::Pay { id, unpaid } => handle_pay(&id, !unpaid),
        Commands::Reschedule { id, date } => handle_reschedule(&id, &date),
        Commands::Assign { id, user } => handle_assign(&id, &user),
        Commands::History { id } => handle_history(&id),
        Commands::Bulk { subcommand } => handle_bulk(subcommand),
        Commands::Statuses { subcommand } => handle_statuses(subcommand),
        Commands::Users { subcommand } => handle_users(subcommand),
        Commands::Channels { subcommand } => handle_channels(subcommand),
        Commands::Views { subcommand } => handle_views(subcommand),
    }
}

/// Load configuration and open the job ledger
fn open() -> Result<(Config, Dashboard<SqliteBackend>)> {
    let config = Config::load().context("Failed to load configuration")?;
    let conn = DbConnection::connect(&config).context("Failed to connect to database")?;
    let actor = Actor::from_config(&config);
    Ok((config, Dashboard::new(SqliteBackend::new(conn), actor)))
}

fn job_id(id: &str) -> Result<i64> {
    Ok(validate_job_id(id).map_err(|e| JobError::validation("id", e))?)
}

fn resolve_user(conn: &Connection, user: &str) -> Result<User> {
    let found = match user.parse::<i64>() {
        Ok(id) => UserRepo::get_by_id(conn, id)?,
        Err(_) => UserRepo::get_by_name(conn, user)?,
    };
    if let Some(found) = found {
        return Ok(found);
    }
    let users = UserRepo::list_all(conn)?;
    Err(JobError::NotFound {
        entity: "User",
        key: user.to_string(),
        suggestion: fuzzy::closest_match(user, users.iter().map(|u| u.name.as_str()), 2),
    }
    .into())
}

fn resolve_channel(conn: &Connection, channel: &str) -> Result<PaymentChannel> {
    let found = match channel.parse::<i64>() {
        Ok(id) => ChannelRepo::get_by_id(conn, id)?,
        Err(_) => ChannelRepo::get_by_name(conn, channel)?,
    };
    if let Some(found) = found {
        return Ok(found);
    }
    let channels = ChannelRepo::list_all(conn)?;
    Err(JobError::NotFound {
        entity: "Payment channel",
        key: channel.to_string(),
        suggestion: fuzzy::closest_match(channel, channels.iter().map(|c| c.name.as_str()), 2),
    }
    .into())
}

/// Encode `KEY=VALUE` arguments as a list-state query string
fn params_to_query(params: &[String]) -> Result<String> {
    let pairs = parse_key_values(params).map_err(|e| JobError::validation("arguments", e))?;
    Ok(serde_urlencoded::to_string(&pairs)?)
}

/// List state from the configured defaults, an optional saved view, then
/// the command-line keys
fn build_list_state(conn: &Connection, config: &Config, view: Option<&str>, params: &[String]) -> Result<ListViewState> {
    let mut state = ListViewState::new(config.page_limit);
    if let Some(name) = view {
        let saved = match ViewRepo::get_by_name(conn, VIEW_ENTITY, name)? {
            Some(saved) => saved,
            None => {
                let views = ViewRepo::list(conn, VIEW_ENTITY)?;
                return Err(JobError::NotFound {
                    entity: "View",
                    key: name.to_string(),
                    suggestion: fuzzy::closest_match(name, views.iter().map(|v| v.name.as_str()), 2),
                }
                .into());
            }
        };
        state = state.with_query_string(&saved.query)?;
    }
    Ok(state.with_query_string(&params_to_query(params)?)?)
}

fn handle_add(args: AddArgs) -> Result<()> {
    validate_non_empty(&args.name, "Job name").map_err(|e| JobError::validation("name", e))?;
    validate_non_empty(&args.client, "Client name").map_err(|e| JobError::validation("client", e))?;

    let (_, dashboard) = open()?;
    let conn = dashboard.backend().conn();

    let income_cost = match &args.income {
        Some(v) => parse_amount(v).map_err(|e| JobError::validation("income", e))?,
        None => Default::default(),
    };
    let staff_cost = match &args.staff_cost {
        Some(v) => parse_amount(v).map_err(|e| JobError::validation("staff-cost", e))?,
        None => Default::default(),
    };
    let due_at = match &args.due {
        Some(expr) => Some(parse_date_expr(expr).map_err(|e| JobError::validation("due", e.to_string()))?),
        None => None,
    };
    let payment_channel_id = match &args.channel {
        Some(channel) => Some(resolve_channel(conn, channel)?.id),
        None => None,
    };
    let mut assignee_ids = Vec::new();
    for user in &args.assignees {
        assignee_ids.push(resolve_user(conn, user)?.id);
    }

    let new_job = NewJob {
        display_name: args.name.trim().to_string(),
        job_number: args.number,
        client_name: args.client.trim().to_string(),
        income_cost,
        staff_cost,
        payment_channel_id,
        job_type: args.job_type,
        due_at,
        assignee_ids,
        attachments: args.attachments,
        status_code: args.status,
    };
    let job = dashboard.backend().create_job(&new_job)?;
    println!("Created job {} ({}) in '{}'.", job.id, job.job_number, job.status.code);
    Ok(())
}

fn handle_list(params: Vec<String>, view: Option<String>, json: bool) -> Result<()> {
    let (config, mut dashboard) = open()?;
    let state = build_list_state(dashboard.backend().conn(), &config, view.as_deref(), &params)?;

    let mut table = JobTable::new(state);
    let mut page = dashboard.list_jobs(&table.query())?;
    table.load(&page);
    if page.paginate.total_pages > 0 && table.state().page() > page.paginate.total_pages {
        // Past the last page: clamp and fetch again
        table.apply(TableAction::SetPage(page.paginate.total_pages));
        page = dashboard.list_jobs(&table.query())?;
        table.load(&page);
    }
    let query = table.state().to_query_string();

    if json {
        let output = serde_json::json!({
            "jobs": page.jobs,
            "paginate": page.paginate,
            "query": query,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if page.jobs.is_empty() {
        println!("No jobs found.");
    } else {
        let lookups = TableLookups {
            channels: ChannelRepo::list_all(dashboard.backend().conn())?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
        };
        let columns = table.state().visible_columns().columns();
        print!("{}", format_job_table(&page.jobs, &columns, &lookups, get_terminal_width(), is_tty()));
        println!("{}", format_pagination(&page.paginate));
    }
    println!("Query: {}", query);
    Ok(())
}

fn handle_show(id: &str, json: bool) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let job = dashboard.get_job(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
        return Ok(());
    }

    let targets = dashboard.gateway().quick_targets(&job)?;
    let channel = match job.payment_channel_id {
        Some(channel_id) => ChannelRepo::get_by_id(dashboard.backend().conn(), channel_id)?.map(|c| c.name),
        None => None,
    };
    print!("{}", format_job_summary(&job, channel.as_deref(), &targets));
    Ok(())
}

fn handle_step(id: &str, direction: Direction) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let job = dashboard.gateway().quick_step(id, direction)?;
    println!("Job {} is now '{}'.", job.id, job.status.code);
    Ok(())
}

fn handle_move(id: &str, code: &str, force: bool) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let mut gateway = dashboard.gateway();
    let job = if force {
        gateway.force_change(id, code)?
    } else {
        gateway.quick_change(id, code)?
    };
    println!("Job {} is now '{}'.", job.id, job.status.code);
    Ok(())
}

fn handle_targets(id: &str) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let job = dashboard.get_job(id)?;
    let gateway = dashboard.gateway();

    let quick = gateway.quick_targets(&job)?;
    println!("Job {} is '{}'.", job.id, job.status.code);
    if quick.is_empty() {
        println!("Quick change: (none)");
    } else {
        let codes: Vec<&str> = quick.iter().map(|s| s.code.as_str()).collect();
        println!("Quick change: {}", codes.join(", "));
    }
    if gateway.actor().role.is_admin() {
        let force = gateway.force_targets(&job)?;
        let codes: Vec<&str> = force.iter().map(|s| s.code.as_str()).collect();
        println!("Force change: {}", codes.join(", "));
    }
    Ok(())
}

fn handle_pay(id: &str, is_paid: bool) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let job = dashboard.gateway().mark_paid(id, is_paid)?;
    println!("Job {} marked {}.", job.id, if job.is_paid { "paid" } else { "unpaid" });
    Ok(())
}

fn handle_reschedule(id: &str, date: &str) -> Result<()> {
    let id = job_id(id)?;
    let due_at = match date.trim().to_lowercase().as_str() {
        "none" | "clear" => None,
        _ => Some(parse_date_expr(date).map_err(|e| JobError::validation("date", e.to_string()))?),
    };
    let (_, mut dashboard) = open()?;
    let job = dashboard.gateway().reschedule(id, due_at)?;
    match job.due_at {
        Some(due) => println!("Job {} is due {}.", job.id, due.format("%Y-%m-%d")),
        None => println!("Job {} has no due date.", job.id),
    }
    Ok(())
}

fn handle_assign(id: &str, user: &str) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    let user = resolve_user(dashboard.backend().conn(), user)?;
    let job = dashboard.gateway().assign(id, user.id)?;
    println!("Assigned {} to job {}.", user.name, job.id);
    Ok(())
}

fn handle_history(id: &str) -> Result<()> {
    let id = job_id(id)?;
    let (_, mut dashboard) = open()?;
    dashboard.get_job(id)?;
    let records = HistoryRepo::list_for_job(dashboard.backend().conn(), id)?;
    print!("{}", format_history(id, &records));
    Ok(())
}

fn handle_bulk(cmd: BulkCommands) -> Result<()> {
    let (config, mut dashboard) = open()?;

    let (action, selection) = match cmd {
        BulkCommands::Status { code, selection } => (BulkAction::Status(code), selection),
        BulkCommands::Pay { unpaid, selection } => (BulkAction::Paid(!unpaid), selection),
        BulkCommands::Assign { user, selection } => {
            let user = resolve_user(dashboard.backend().conn(), &user)?;
            (BulkAction::Assign(user.id), selection)
        }
    };

    let target = if selection.all {
        let state = build_list_state(
            dashboard.backend().conn(),
            &config,
            selection.view.as_deref(),
            &selection.params,
        )?;
        BulkTarget::AllMatching(state.to_list_query())
    } else if let Some(ids) = &selection.ids {
        if !selection.params.is_empty() {
            return Err(JobError::validation("arguments", "list keys only apply with --all").into());
        }
        BulkTarget::Ids(parse_job_id_list(ids).map_err(|e| JobError::validation("ids", e))?)
    } else {
        return Err(JobError::validation("selection", "choose jobs with --all or --ids").into());
    };

    let except = match &selection.except {
        Some(spec) => parse_job_id_list(spec).map_err(|e| JobError::validation("except", e))?,
        None => Vec::new(),
    };

    let mut executor = dashboard.bulk();
    let ids: Vec<i64> = executor
        .expand(&target)?
        .into_iter()
        .filter(|id| !except.contains(id))
        .collect();
    if ids.is_empty() {
        println!("No jobs selected.");
        return Ok(());
    }

    let report = executor.apply(&ids, &action);
    print!("{}", format_bulk_report(&report, is_tty()));
    if !report.is_clean() {
        anyhow::bail!("{} of {} job(s) failed", report.failed.len(), report.total());
    }
    Ok(())
}

fn handle_statuses(cmd: StatusCommands) -> Result<()> {
    let (_, dashboard) = open()?;
    let conn = dashboard.backend().conn();

    match cmd {
        StatusCommands::List { json } => {
            let statuses = dashboard.backend().list_statuses()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", format_status_list(&statuses, is_tty()));
            }
        }
        StatusCommands::Add { code, name, order, prev, next, color, system_type } => {
            validate_status_code(&code).map_err(|e| JobError::validation("code", e))?;
            validate_non_empty(&name, "Status name").map_err(|e| JobError::validation("name", e))?;
            if !is_hex_color(&color) {
                return Err(JobError::validation("color", format!("'{}' is not #rrggbb", color)).into());
            }
            let system_type = SystemType::from_str(&system_type).ok_or_else(|| {
                JobError::validation("type", format!("unknown system type '{}'", system_type))
            })?;

            let tx = conn.unchecked_transaction()?;
            if StatusRepo::get_by_code(&tx, &code)?.is_some() {
                return Err(JobError::validation("code", format!("status '{}' already exists", code)).into());
            }
            if StatusRepo::get_by_order(&tx, order)?.is_some() {
                return Err(JobError::validation("order", format!("order {} is taken", order)).into());
            }

            StatusRepo::create(&tx, &code, name.trim(), &color, order, prev, next, system_type)?;
            if let Some(prev_status) = prev.map(|p| StatusRepo::get_by_order(&tx, p)).transpose()?.flatten() {
                StatusRepo::set_links(&tx, prev_status.order, prev_status.prev_status_order, Some(order))?;
            }
            if let Some(next_status) = next.map(|n| StatusRepo::get_by_order(&tx, n)).transpose()?.flatten() {
                StatusRepo::set_links(&tx, next_status.order, Some(order), next_status.next_status_order)?;
            }

            let issues = StatusCatalog::new(StatusRepo::list_all(&tx)?).validate();
            if !issues.is_empty() {
                // Dropping the transaction rolls the insert back
                return Err(JobError::validation("status", format_catalog_issues(&issues).trim_end()).into());
            }
            tx.commit()?;
            log::info!("Added status '{}' at order {}", code, order);
            println!("Added status '{}' at order {}.", code, order);
        }
        StatusCommands::Check => {
            let catalog = StatusCatalog::new(dashboard.backend().list_statuses()?);
            let issues = catalog.validate();
            print!("{}", format_catalog_issues(&issues));
            if !issues.is_empty() {
                return Err(JobError::validation("statuses", format!("{} issue(s) found", issues.len())).into());
            }
        }
    }
    Ok(())
}

fn handle_users(cmd: UserCommands) -> Result<()> {
    let (_, dashboard) = open()?;
    let conn = dashboard.backend().conn();
    match cmd {
        UserCommands::Add { name } => {
            let name = name.trim();
            validate_non_empty(name, "User name").map_err(|e| JobError::validation("name", e))?;
            if UserRepo::get_by_name(conn, name)?.is_some() {
                return Err(JobError::validation("name", format!("user '{}' already exists", name)).into());
            }
            let user = UserRepo::create(conn, name)?;
            println!("Created user {} '{}'.", user.id, user.name);
        }
        UserCommands::List { json } => {
            let users = UserRepo::list_all(conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else if users.is_empty() {
                println!("No users.");
            } else {
                for user in users {
                    println!("{:>4}  {}", user.id, user.name);
                }
            }
        }
    }
    Ok(())
}

fn handle_channels(cmd: ChannelCommands) -> Result<()> {
    let (_, dashboard) = open()?;
    let conn = dashboard.backend().conn();
    match cmd {
        ChannelCommands::Add { name } => {
            let name = name.trim();
            validate_non_empty(name, "Channel name").map_err(|e| JobError::validation("name", e))?;
            if ChannelRepo::get_by_name(conn, name)?.is_some() {
                return Err(JobError::validation("name", format!("channel '{}' already exists", name)).into());
            }
            let channel = ChannelRepo::create(conn, name)?;
            println!("Created payment channel {} '{}'.", channel.id, channel.name);
        }
        ChannelCommands::List { json } => {
            let channels = ChannelRepo::list_all(conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
            } else if channels.is_empty() {
                println!("No payment channels.");
            } else {
                for channel in channels {
                    println!("{:>4}  {}", channel.id, channel.name);
                }
            }
        }
    }
    Ok(())
}

fn handle_views(cmd: ViewCommands) -> Result<()> {
    let (config, dashboard) = open()?;
    let conn = dashboard.backend().conn();
    match cmd {
        ViewCommands::Save { name, params } => {
            validate_non_empty(&name, "View name").map_err(|e| JobError::validation("name", e))?;
            let state = ListViewState::new(config.page_limit).with_query_string(&params_to_query(&params)?)?;
            let view = ViewRepo::upsert(conn, name.trim(), VIEW_ENTITY, &state.to_query_string())?;
            println!("Saved view '{}': {}", view.name, view.query);
        }
        ViewCommands::List => {
            let views = ViewRepo::list(conn, VIEW_ENTITY)?;
            if views.is_empty() {
                println!("No saved views.");
            }
            for view in views {
                println!("{}  {}", view.name, view.query);
            }
        }
    }
    Ok(())
}
