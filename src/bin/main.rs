use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lecture_runner::{Config, Runner, TelegramNotifier, WebDriverSession};

#[derive(Parser)]
#[command(name = "lecture-runner")]
#[command(about = "Unattended lecture playback for the campus portal")]
#[command(version)]
struct Cli {
    /// Run the browser headless (overrides HEADLESS)
    #[arg(long)]
    headless: bool,

    /// Run a single pass and exit (for an external scheduler)
    #[arg(long)]
    once: bool,

    /// Send a report of incomplete subjects instead of watching lectures
    #[arg(long)]
    report: bool,

    /// Verbose output (-v for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> lecture_runner::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            _ => Level::DEBUG,
        }
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let mut config = Config::from_env()?;
    if cli.headless {
        config.headless = true;
    }

    let notifier = TelegramNotifier::new(&config.telegram_token, config.telegram_chat_id);
    let session = WebDriverSession::connect(&config.webdriver_url, config.headless).await?;

    let runner = Runner::new(&session, &notifier, &config);
    let outcome = if cli.report {
        runner.run_report().await
    } else if cli.once {
        runner.run_scheduled().await.map(|summary| {
            println!("watched {} lectures", summary.lectures_watched);
        })
    } else {
        runner.run_forever().await;
        Ok(())
    };

    session.quit().await?;
    outcome
}
