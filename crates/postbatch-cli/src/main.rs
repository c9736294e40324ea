mod directory;
mod inbox;
mod watch;

use clap::{Parser, Subcommand};
use postbatch_core::TriggerSchedule;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postbatch")]
#[command(about = "Publish product listings from submission spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process every supported file in the inbox folder
    ProcessInbox,
    /// Process a single file by id (path relative to the storage root)
    ProcessFile {
        /// File id, e.g. inbox/menu.xlsx
        file_id: String,
    },
    /// List directory accounts visible to the access token
    Accounts,
    /// List an account's locations keyed by store code
    Locations {
        /// Account id, bare (123) or as a resource name (accounts/123)
        account: String,
    },
    /// List media items attached to a location
    Media {
        /// Location resource name, e.g. accounts/123/locations/456
        location: String,
    },
    /// Show the store registry
    Stores,
    /// Process the inbox on a schedule until interrupted
    Watch {
        /// Trigger schedule in local time: daily@H, weekly@DAY@H or every@N (repeatable)
        #[arg(long = "schedule", required = true)]
        schedules: Vec<TriggerSchedule>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("postbatch ready; run with --help to list commands");
        return Ok(());
    };

    let config = postbatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::ProcessInbox => inbox::run_process_inbox(&config).await,
        Commands::ProcessFile { file_id } => inbox::run_process_file(&config, &file_id).await,
        Commands::Accounts => directory::run_accounts(&config).await,
        Commands::Locations { account } => directory::run_locations(&config, &account).await,
        Commands::Media { location } => directory::run_media(&config, &location).await,
        Commands::Stores => directory::run_stores(&config),
        Commands::Watch { schedules } => watch::run_watch(&config, &schedules).await,
    }
}
