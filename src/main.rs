use std::{io::Write, sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roombook::{
    config::Config,
    models::booking::{display_time, BookingRecord, MonthGroup},
    routes,
    services::{
        api::ApiClient,
        board::{BoardSnapshot, BoardView},
        booking_flow::{BookingFlow, FlowState},
        booking_form::{bookable_rooms, BookingDraft},
        cancellation::{cancel_with_email, CancelOutcome},
        grouping,
        poller::{fetch_snapshot, Poller},
    },
    AppState,
};

#[derive(Parser)]
#[command(name = "roombook", about = "Meeting room bookings: board server and CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the booking API and serve the board over HTTP
    Serve,
    /// List rooms
    Rooms,
    /// Show bookings grouped by month and date
    Schedule {
        /// Only this room
        #[arg(long)]
        room: Option<i64>,
        /// Only this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print a flat list for one day (today unless --date is given)
        #[arg(long)]
        flat: bool,
    },
    /// Book a room
    Book {
        #[arg(long)]
        room: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM, defaults to start + 90 minutes
        #[arg(long, default_value = "")]
        end: String,
        /// Person in charge
        #[arg(long)]
        pic: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        user_id: Option<i64>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Cancel a booking; the email must match the booking's
    Cancel {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    let api = ApiClient::new(&config)?;

    match cli.command {
        Command::Serve => serve(config, api).await,
        Command::Rooms => {
            for room in api.list_rooms().await? {
                let state = if room.is_active() { "" } else { " (inactive)" };
                println!("{:>4}  {}  capacity {}{}", room.id, room.name, room.capacity, state);
            }
            Ok(())
        }
        Command::Schedule { room, date, flat } => {
            let snapshot = fetch_snapshot(&api).await?;
            let view = BoardView { room_id: room, date };
            if flat {
                let day = date.unwrap_or_else(|| Local::now().date_naive());
                let bookings = view.day_list(&snapshot.groups, day);
                if bookings.is_empty() {
                    println!("No bookings on {day}");
                }
                for booking in &bookings {
                    print_booking(&snapshot, booking, "");
                }
            } else {
                print_groups(&snapshot, &view.apply(&snapshot.groups));
            }
            Ok(())
        }
        Command::Book {
            room,
            date,
            start,
            end,
            pic,
            email,
            topic,
            user_id,
            yes,
        } => {
            let draft = BookingDraft {
                room_id: Some(room),
                user_id,
                date,
                start_time: start,
                end_time: end,
                pic,
                email,
                topic,
            };
            book(&config, &api, draft, yes).await
        }
        Command::Cancel { id, email } => {
            let bookings = api.list_bookings().await?;
            let Some(booking) = bookings.iter().find(|b| b.id == id) else {
                anyhow::bail!("Booking {} not found", id);
            };
            match cancel_with_email(&api, booking, &email, &config.cancel_override_emails).await? {
                CancelOutcome::Cancelled => println!("Booking {id} cancelled"),
                CancelOutcome::EmailMismatch => anyhow::bail!("Email does not match!"),
            }
            Ok(())
        }
    }
}

async fn serve(config: Arc<Config>, api: ApiClient) -> anyhow::Result<()> {
    let poller = Poller::spawn_for(api.clone(), Duration::from_secs(config.poll_interval_secs));
    info!(
        "Polling {} every {}s",
        config.api_base_url, config.poll_interval_secs
    );

    let state = AppState {
        api,
        board: poller.subscribe(),
        config: config.clone(),
    };
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("roombook board listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    poller.stop().await;
    Ok(())
}

async fn book(config: &Config, api: &ApiClient, draft: BookingDraft, yes: bool) -> anyhow::Result<()> {
    let rooms = api.list_rooms().await?;
    let room_id = draft.room_id.unwrap_or_default();
    let Some(room) = bookable_rooms(&rooms, &config.excluded_room_ids)
        .into_iter()
        .find(|r| r.id == room_id)
    else {
        anyhow::bail!("Room {} is not available for booking", room_id);
    };

    let mut flow = BookingFlow::new(config.receptionist_phone.clone());
    if let FlowState::AwaitingConfirmation(pending) = flow.submit(&draft, &room.name)? {
        let req = &pending.request;
        println!(
            "{} on {} from {} to {}\n  {} ({})",
            room.name, req.date, req.start_time, req.end_time, req.topic, req.pic
        );
    }
    if let FlowState::InvalidForm(e) = flow.state() {
        anyhow::bail!("Please fill in every field: {e}");
    }

    if !yes && !confirm_prompt("Continue with this booking?")? {
        flow.revise()?;
        println!("Booking not sent");
        return Ok(());
    }

    match flow.submit_with(api).await? {
        FlowState::Success(notice) => {
            println!("{}", notice.summary);
            if let Some(link) = &notice.receptionist_link {
                println!("Confirm with the receptionist: {link}");
            }
            Ok(())
        }
        FlowState::Conflict => {
            anyhow::bail!("Room unavailable: please choose another room or time")
        }
        FlowState::Failed(message) => anyhow::bail!("Booking failed: {message}"),
        other => anyhow::bail!("Booking ended in unexpected state: {}", other.name()),
    }
}

fn confirm_prompt(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_groups(snapshot: &BoardSnapshot, groups: &[MonthGroup]) {
    if groups.is_empty() {
        println!("No bookings");
        return;
    }
    for month in groups {
        println!("{}", month.month);
        for date in &month.dates {
            println!("  {}", date.date.format("%a %d %b"));
            for booking in &date.schedules {
                print_booking(snapshot, booking, "    ");
            }
        }
    }
    let total = grouping::count_schedules(groups);
    println!("{total} booking(s)");
}

fn print_booking(snapshot: &BoardSnapshot, booking: &BookingRecord, indent: &str) {
    println!(
        "{indent}#{} {}-{}  {}  {} ({})",
        booking.id,
        display_time(&booking.start_time),
        display_time(&booking.end_time),
        snapshot.room_name(booking.room_id),
        booking.topic,
        booking.pic
    );
}
