// ABOUTME: Command-line surface: clap definitions and the dispatcher that drives the stores.
// ABOUTME: Every command except `login` requires a stored session; budgets are validated here.

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use guest_manager_core::datetime::{format_local, parse_local};
use guest_manager_core::export::{export_event_markdown, export_guests_csv};
use guest_manager_core::report::{dashboard_stats, event_stats, filter_guests};
use guest_manager_core::{
    AccommodationDetails, Event, EventCategory, EventPatch, Guest, GuestFilter, GuestPatch, NewGuest,
    RequirementFilter, TransportDetails,
};
use guest_manager_store::{
    AdminCredentials, CredentialGate, EventStore, FileStore, KeyValueStore, export_json,
    import_json, write_backup, write_guest_csv,
};

use crate::config::ManagerConfig;

#[derive(Debug, Parser)]
#[command(name = "guest-manager", version, about = "Manage events, sub-events, and guest logistics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with the admin account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in admin account.
    Whoami,
    /// Replace the admin email and password.
    SetCredentials {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    #[command(subcommand)]
    Event(EventCommand),
    #[command(subcommand)]
    SubEvent(SubEventCommand),
    #[command(subcommand)]
    Guest(GuestCommand),
    /// Write a dated JSON backup of every event.
    Export {
        /// Destination directory (defaults to GUEST_MANAGER_EXPORT_DIR).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print the backup instead of writing a file.
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },
    /// Replace every event with the contents of a JSON backup.
    Import { path: PathBuf },
    /// Export the guest list of one event as CSV.
    Csv {
        event_id: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },
    /// Dashboard counters, or counters for one event.
    Stats { event_id: Option<String> },
}

impl Command {
    fn requires_session(&self) -> bool {
        !matches!(self, Command::Login { .. })
    }
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    Add {
        name: String,
        #[arg(long)]
        date: NaiveDate,
        /// Length in days, at least 1.
        #[arg(long, default_value_t = 1, value_parser = parse_duration)]
        duration: u32,
        #[arg(long)]
        category: EventCategory,
    },
    List,
    /// Print an event as a Markdown run sheet.
    Show { id: String },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_duration)]
        duration: Option<u32>,
        #[arg(long)]
        category: Option<EventCategory>,
    },
    /// Set the budget of an event.
    Budget {
        id: String,
        #[arg(value_parser = parse_budget, allow_hyphen_values = true)]
        amount: f64,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SubEventCommand {
    Add {
        event_id: String,
        name: String,
        /// Local date-time, e.g. 2024-05-01T09:30.
        #[arg(long, value_parser = parse_local)]
        at: NaiveDateTime,
    },
    /// Delete a sub-event; its guests move back to the main event.
    Delete {
        event_id: String,
        sub_event_id: String,
    },
}

#[derive(Debug, Args)]
pub struct GuestDetails {
    #[arg(long, default_value = "")]
    designation: String,
    #[arg(long, default_value = "")]
    organization: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    sub_event: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransportArgs {
    /// Guest needs transport.
    #[arg(long)]
    transport: bool,
    #[arg(long, value_parser = parse_local, requires = "transport")]
    arrival: Option<NaiveDateTime>,
    #[arg(long = "return", value_parser = parse_local, requires = "transport")]
    return_time: Option<NaiveDateTime>,
    #[arg(long, requires = "transport")]
    pickup: Option<String>,
    #[arg(long, requires = "transport")]
    drop: Option<String>,
}

impl TransportArgs {
    fn into_details(self) -> TransportDetails {
        TransportDetails {
            required: self.transport,
            arrival_time: self.arrival,
            return_time: self.return_time,
            pickup_location: self.pickup.unwrap_or_default(),
            drop_location: self.drop.unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct AccommodationArgs {
    /// Guest needs accommodation.
    #[arg(long)]
    accommodation: bool,
    #[arg(long, requires = "accommodation")]
    hotel: Option<String>,
    #[arg(long, value_parser = parse_local, requires = "accommodation")]
    check_in: Option<NaiveDateTime>,
    #[arg(long, value_parser = parse_local, requires = "accommodation")]
    check_out: Option<NaiveDateTime>,
}

impl AccommodationArgs {
    fn into_details(self) -> AccommodationDetails {
        AccommodationDetails {
            required: self.accommodation,
            name: self.hotel.unwrap_or_default(),
            check_in: self.check_in,
            check_out: self.check_out,
            ..Default::default()
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum GuestCommand {
    Add {
        event_id: String,
        name: String,
        #[command(flatten)]
        details: GuestDetails,
        #[command(flatten)]
        transport: TransportArgs,
        #[command(flatten)]
        accommodation: AccommodationArgs,
    },
    /// Change guest fields. An empty --contact or --sub-event clears it.
    Update {
        event_id: String,
        guest_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        designation: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        sub_event: Option<String>,
    },
    Delete {
        event_id: String,
        guest_id: String,
    },
    /// Toggle attendance.
    Attend {
        event_id: String,
        guest_id: String,
    },
    /// Turn transport on, or off with --off (clears transport details).
    Transport {
        event_id: String,
        guest_id: String,
        #[arg(long)]
        off: bool,
    },
    /// Toggle the arrival mark.
    Arrive {
        event_id: String,
        guest_id: String,
    },
    /// Toggle the return mark.
    Return {
        event_id: String,
        guest_id: String,
    },
    /// Turn accommodation on, or off with --off (clears venue and dates).
    Accommodation {
        event_id: String,
        guest_id: String,
        #[arg(long)]
        off: bool,
    },
    /// Advance booked -> checked-in -> checked-out -> booked.
    AdvanceStatus {
        event_id: String,
        guest_id: String,
    },
    List {
        event_id: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Requirement {
    #[default]
    All,
    Required,
    NotRequired,
}

impl From<Requirement> for RequirementFilter {
    fn from(value: Requirement) -> Self {
        match value {
            Requirement::All => RequirementFilter::All,
            Requirement::Required => RequirementFilter::Required,
            Requirement::NotRequired => RequirementFilter::NotRequired,
        }
    }
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Case-insensitive match on name, designation, or organization.
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long = "in-sub-event")]
    in_sub_event: Option<String>,
    #[arg(long = "transport-filter", value_enum, default_value_t)]
    transport: Requirement,
    #[arg(long = "accommodation-filter", value_enum, default_value_t)]
    accommodation: Requirement,
}

impl From<FilterArgs> for GuestFilter {
    fn from(args: FilterArgs) -> Self {
        GuestFilter {
            query: args.search,
            sub_event_id: args.in_sub_event,
            transport: args.transport.into(),
            accommodation: args.accommodation.into(),
        }
    }
}

/// A budget must be a finite, non-negative number.
pub fn parse_budget(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{:?} is not a number", raw))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err("budget must be a valid positive number".to_string());
    }
    Ok(amount)
}

/// An event lasts a whole number of days, at least one.
pub fn parse_duration(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("duration must be at least 1 day".to_string()),
        Ok(days) => Ok(days),
        Err(_) => Err(format!("{:?} is not a whole number of days", raw)),
    }
}

/// `Some("")` from the command line means "clear".
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn run(cli: Cli, config: &ManagerConfig) -> anyhow::Result<()> {
    let kv = FileStore::open(&config.home)
        .with_context(|| format!("opening data directory {}", config.home.display()))?;
    let gate = CredentialGate::new(&kv);
    gate.initialize()?;

    if cli.command.requires_session() && !gate.is_authenticated()? {
        bail!("not signed in; run `guest-manager login` first");
    }

    match cli.command {
        Command::Login { email, password } => {
            if !gate.authenticate(&email, &password)? {
                bail!("Invalid credentials");
            }
            println!("Signed in as {}", email);
        }
        Command::Logout => {
            gate.logout()?;
            println!("Signed out");
        }
        Command::Whoami => println!("{}", gate.credentials()?.email),
        Command::SetCredentials { email, password } => {
            if email.trim().is_empty() || password.is_empty() {
                bail!("email and password must not be empty");
            }
            gate.set_credentials(&AdminCredentials::new(email, password))?;
            println!("Credentials updated");
        }
        Command::Event(command) => run_event(&mut EventStore::open(&kv)?, command)?,
        Command::SubEvent(command) => run_sub_event(&mut EventStore::open(&kv)?, command)?,
        Command::Guest(command) => run_guest(&mut EventStore::open(&kv)?, command)?,
        Command::Export { dir, stdout } => {
            let store = EventStore::open(&kv)?;
            if stdout {
                println!("{}", export_json(&store)?);
            } else {
                let dir = dir.unwrap_or_else(|| config.export_dir.clone());
                let path = write_backup(&store, &dir, Local::now().date_naive())?;
                println!("Exported {} events to {}", store.events().len(), path.display());
            }
        }
        Command::Import { path } => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let mut store = EventStore::open(&kv)?;
            let count = import_json(&mut store, &text)?;
            println!("Imported {} events", count);
        }
        Command::Csv {
            event_id,
            filter,
            dir,
            stdout,
        } => {
            let store = EventStore::open(&kv)?;
            let event = require_event(&store, &event_id)?;
            let filter = GuestFilter::from(filter);
            if stdout {
                print!("{}", export_guests_csv(event, &filter)?);
            } else {
                let dir = dir.unwrap_or_else(|| config.export_dir.clone());
                let path = write_guest_csv(&dir, event, &filter)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Stats { event_id } => {
            let store = EventStore::open(&kv)?;
            let json = match event_id {
                Some(id) => serde_json::to_string_pretty(&event_stats(require_event(&store, &id)?))?,
                None => serde_json::to_string_pretty(&dashboard_stats(store.events()))?,
            };
            println!("{}", json);
        }
    }
    Ok(())
}

fn require_event<'a, S: KeyValueStore>(store: &'a EventStore<S>, id: &str) -> anyhow::Result<&'a Event> {
    store
        .get_event_by_id(id)
        .with_context(|| format!("no event with id {}", id))
}

fn ensure_found(found: bool, what: &str) -> anyhow::Result<()> {
    if !found {
        bail!("{} not found", what);
    }
    Ok(())
}

fn run_event<S: KeyValueStore>(store: &mut EventStore<S>, command: EventCommand) -> anyhow::Result<()> {
    match command {
        EventCommand::Add {
            name,
            date,
            duration,
            category,
        } => {
            if name.trim().is_empty() {
                bail!("event name must not be empty");
            }
            let id = store.add_event(name, date, duration, category)?;
            println!("{}", id);
        }
        EventCommand::List => {
            for event in store.events() {
                println!(
                    "{}  {}  {} [{}] {} day(s), {} guests, budget {:.2}",
                    event.id,
                    event.date.format("%Y-%m-%d"),
                    event.name,
                    event.category,
                    event.duration,
                    event.guests.len(),
                    event.budget
                );
            }
        }
        EventCommand::Show { id } => print!("{}", export_event_markdown(require_event(store, &id)?)),
        EventCommand::Update {
            id,
            name,
            date,
            duration,
            category,
        } => {
            let patch = EventPatch {
                name: non_empty(name),
                date,
                duration,
                category,
                budget: None,
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            ensure_found(store.update_event(&id, patch)?, "event")?;
        }
        EventCommand::Budget { id, amount } => {
            ensure_found(store.update_budget(&id, amount)?, "event")?;
        }
        EventCommand::Delete { id } => ensure_found(store.delete_event(&id)?, "event")?,
    }
    Ok(())
}

fn run_sub_event<S: KeyValueStore>(
    store: &mut EventStore<S>,
    command: SubEventCommand,
) -> anyhow::Result<()> {
    match command {
        SubEventCommand::Add { event_id, name, at } => {
            let id = store
                .add_sub_event(&event_id, name, at)?
                .with_context(|| format!("no event with id {}", event_id))?;
            println!("{}", id);
        }
        SubEventCommand::Delete {
            event_id,
            sub_event_id,
        } => ensure_found(store.delete_sub_event(&event_id, &sub_event_id)?, "sub-event")?,
    }
    Ok(())
}

fn run_guest<S: KeyValueStore>(store: &mut EventStore<S>, command: GuestCommand) -> anyhow::Result<()> {
    match command {
        GuestCommand::Add {
            event_id,
            name,
            details,
            transport,
            accommodation,
        } => {
            if name.trim().is_empty() {
                bail!("guest name must not be empty");
            }
            let new = NewGuest {
                contact: non_empty(details.contact),
                sub_event_id: non_empty(details.sub_event),
                transport: transport.into_details(),
                accommodation: accommodation.into_details(),
                ..NewGuest::new(name, details.designation, details.organization)
            };
            let id = store
                .add_guest(&event_id, new)?
                .with_context(|| format!("no event with id {}", event_id))?;
            println!("{}", id);
        }
        GuestCommand::Update {
            event_id,
            guest_id,
            name,
            designation,
            organization,
            contact,
            sub_event,
        } => {
            let patch = GuestPatch {
                name: non_empty(name),
                designation,
                organization,
                contact: clearable(contact),
                sub_event_id: clearable(sub_event),
                ..Default::default()
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            ensure_found(store.update_guest(&event_id, &guest_id, patch)?, "guest")?;
        }
        GuestCommand::Delete { event_id, guest_id } => {
            ensure_found(store.delete_guest(&event_id, &guest_id)?, "guest")?
        }
        GuestCommand::Attend { event_id, guest_id } => {
            ensure_found(store.toggle_attendance(&event_id, &guest_id)?, "guest")?
        }
        GuestCommand::Transport {
            event_id,
            guest_id,
            off,
        } => ensure_found(store.set_transport_required(&event_id, &guest_id, !off)?, "guest")?,
        GuestCommand::Arrive { event_id, guest_id } => {
            ensure_found(store.toggle_arrival(&event_id, &guest_id)?, "guest")?
        }
        GuestCommand::Return { event_id, guest_id } => {
            ensure_found(store.toggle_return(&event_id, &guest_id)?, "guest")?
        }
        GuestCommand::Accommodation {
            event_id,
            guest_id,
            off,
        } => ensure_found(
            store.set_accommodation_required(&event_id, &guest_id, !off)?,
            "guest",
        )?,
        GuestCommand::AdvanceStatus { event_id, guest_id } => {
            ensure_found(store.advance_accommodation_status(&event_id, &guest_id)?, "guest")?;
            if let Some(guest) = store.guest(&event_id, &guest_id) {
                println!("{}", guest.accommodation.status);
            }
        }
        GuestCommand::List { event_id, filter } => {
            let event = require_event(store, &event_id)?;
            for guest in filter_guests(event, &GuestFilter::from(filter)) {
                print_guest_line(event, guest);
            }
        }
    }
    Ok(())
}

fn print_guest_line(event: &Event, guest: &Guest) {
    let mut line = format!(
        "{}  {} ({}, {})  {}",
        guest.id,
        guest.name,
        guest.designation,
        guest.organization,
        event.session_name(guest.sub_event_id.as_deref())
    );
    if guest.attendance {
        line.push_str("  present");
    }
    if guest.transport.required {
        let arrival = guest.transport.arrival_time.as_ref().map(format_local);
        line.push_str(&format!(
            "  transport[arrival {}{}]",
            arrival.as_deref().unwrap_or("unset"),
            if guest.transport.arrival_marked { ", arrived" } else { "" }
        ));
    }
    if guest.accommodation.required {
        line.push_str(&format!("  stay[{}]", guest.accommodation.status));
    }
    println!("{}", line);
}
