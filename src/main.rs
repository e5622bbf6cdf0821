use skywatch::{
    cmd::{
        run_once,
        subscribers::{self, SubscribersArgs},
    },
    context::AppContextBuilder,
    supervisor::Supervisor,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(version, about = "Aircraft proximity alerts for geofenced subscribers")]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    /// Overrides the configured database URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the scheduler and the HTTP server until interrupted.
    Run,
    /// Runs a single monitoring cycle and prints the result as JSON.
    RunOnce,
    /// Manages subscribers.
    Subscribers(SubscribersArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let mut builder = AppContextBuilder::new(cli.config_dir);
    if let Some(url) = cli.database_url {
        builder = builder.database_url(url);
    }
    let context = builder.build().await?;

    match cli.command {
        Command::Run => {
            let supervisor = Supervisor::builder().context(context).build()?;
            tracing::info!("Watching for aircraft.");
            supervisor.run().await?;
        }
        Command::RunOnce => run_once::print(context).await?,
        Command::Subscribers(args) => {
            let result = subscribers::execute(args, &context.store).await;
            context.store.close().await;
            for line in result? {
                println!("{line}");
            }
        }
    }

    Ok(())
}
