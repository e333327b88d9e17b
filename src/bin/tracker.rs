use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

use creatine_tracker::core::Config;
use creatine_tracker::features::intake::{calendar_days, IntakeLog, Month};
use creatine_tracker::features::reminders::{ReminderManager, TimeOfDay};
use creatine_tracker::notifications::{
    NotificationChannel, NotificationPlatform, ReceivedLogger, SimulatedPlatform,
};
use creatine_tracker::storage::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "tracker", version, about = "Creatine intake tracker with daily reminders")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show reminders, today's intake and this month's progress
    Status,
    /// Enable or disable a reminder
    Toggle { id: String },
    /// Change a reminder's time (HH:MM)
    SetTime { id: String, time: TimeOfDay },
    /// Toggle intake for today or a past date (YYYY-MM-DD)
    Take { date: Option<NaiveDate> },
    /// Monthly progress with calendar (YYYY-MM)
    Stats { month: Option<Month> },
    /// Deliver reminders until Ctrl-C
    Watch,
}

struct App {
    config: Config,
    platform: Arc<SimulatedPlatform>,
    reminders: ReminderManager,
    intake: IntakeLog,
}

impl App {
    async fn start(config: Config) -> Result<Self> {
        let store = Arc::new(JsonFileStore::open(&config.data_path).await?);
        info!("📄 Using data file {}", store.path().display());

        let platform = Arc::new(SimulatedPlatform::new(config.notification_permission));

        let permission = platform.request_permission().await;
        if !permission.is_granted() {
            warn!("Notifications must be enabled to receive reminders (permission {permission})");
        }

        if config.trigger_style.uses_channels() {
            platform
                .configure_channel(&NotificationChannel::reminders())
                .await?;
        }

        let reminders = ReminderManager::from_config(store.clone(), platform.clone(), &config);
        reminders.load().await;

        let intake = IntakeLog::new(store);
        intake.load().await;

        Ok(Self {
            config,
            platform,
            reminders,
            intake,
        })
    }

    async fn run(&self, command: Commands) -> Result<()> {
        let today = Local::now().date_naive();

        match command {
            Commands::Status => {
                self.print_reminders().await;
                let taken = self.intake.is_taken(today).await;
                println!();
                println!(
                    "Today ({}): {}",
                    today,
                    if taken { "taken ✅" } else { "not taken yet" }
                );
                self.print_stats(Month::containing(today), false).await;
            }
            Commands::Toggle { id } => {
                let enabled = self
                    .reminders
                    .toggle(&id)
                    .await
                    .ok_or_else(|| anyhow!("Unknown reminder '{}'", id))?;
                println!(
                    "Reminder {} {}",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                );
                self.flush().await;
            }
            Commands::SetTime { id, time } => {
                if !self.reminders.set_time(&id, time.hour, time.minute).await {
                    return Err(anyhow!("Unknown reminder '{}'", id));
                }
                println!("Reminder {id} set to {time}");
                self.flush().await;
            }
            Commands::Take { date } => {
                let date = date.unwrap_or(today);
                match self.intake.toggle_past(date, today).await? {
                    Some(true) => println!("{date}: taken ✅"),
                    Some(false) => println!("{date}: not taken"),
                    None => println!("{date} is in the future, nothing to mark"),
                }
            }
            Commands::Stats { month } => {
                self.print_stats(month.unwrap_or_else(|| Month::containing(today)), true)
                    .await;
            }
            Commands::Watch => self.watch().await?,
        }

        Ok(())
    }

    async fn flush(&self) {
        let report = self.reminders.flush().await;
        if !report.permission.is_granted() {
            println!("Notifications are {}; no alerts scheduled", report.permission);
        } else {
            println!("{} alert(s) scheduled", report.scheduled_count());
        }
        for (id, e) in &report.failed {
            println!("Reminder {id} could not be scheduled: {e}");
        }
    }

    async fn watch(&self) -> Result<()> {
        let logger = ReceivedLogger::register(self.platform.hub());

        self.reminders.flush().await;
        for scheduled in self.platform.list_scheduled().await? {
            info!(
                "Scheduled '{}' next at {}",
                scheduled.content.title, scheduled.next_fire
            );
        }

        info!(
            "Watching for due reminders every {}s (Ctrl-C to stop)",
            self.config.delivery_poll.as_secs()
        );
        let mut interval = tokio::time::interval(self.config.delivery_poll);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.platform.deliver_due(Local::now().naive_local());
                }
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for Ctrl-C: {e}");
                    }
                    break;
                }
            }
        }

        info!("Shutting down...");
        logger.unregister().await;
        self.reminders.flush().await;
        Ok(())
    }

    async fn print_reminders(&self) {
        println!("Reminders:");
        for reminder in self.reminders.reminders().await {
            println!(
                "  [{}] {}  {}  {}",
                if reminder.enabled { "x" } else { " " },
                reminder.id,
                reminder.time_of_day,
                reminder.title
            );
        }
    }

    async fn print_stats(&self, month: Month, with_calendar: bool) {
        let stats = self.intake.monthly_stats(month).await;
        println!();
        println!(
            "{}: {}/{} days tracked ({}%)",
            month, stats.days_tracked, stats.days_in_month, stats.completion_rate
        );

        if !with_calendar {
            return;
        }

        let taken = self.intake.taken_dates().await;
        println!();
        println!(" Mo  Tu  We  Th  Fr  Sa  Su");
        for week in calendar_days(month).chunks(7) {
            let row: Vec<String> = week
                .iter()
                .map(|day| {
                    if !day.in_month {
                        "  . ".to_string()
                    } else if taken.contains(&day.date) {
                        format!("{:>3}*", day.day)
                    } else {
                        format!("{:>3} ", day.day)
                    }
                })
                .collect();
            println!("{}", row.join(""));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Status);

    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting creatine tracker...");
    let app = App::start(config).await?;
    app.run(command).await
}
