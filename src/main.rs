// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;

use dsb_bot::app_config::{Config, LogLevel};
use dsb_bot::bot::SubstitutionBot;
use dsb_bot::converter::PlanConverter;
use dsb_bot::dsb_client::DsbClient;
use dsb_bot::file_utils::FileManager;
use dsb_bot::git_manager::GitManager;
use dsb_bot::logging::BotLogger;
use dsb_bot::notifier::{DiscordNotifier, Notifier};
use dsb_bot::system_monitor;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll DSB and publish new plans (default command)
    Run(RunArgs),

    /// Convert a saved teacher plan into student plans
    Convert(ConvertArgs),

    /// Generate shell completions for dsb_bot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Environment file with credentials and webhooks
    #[arg(short, long, default_value = ".env")]
    env_file: PathBuf,

    /// Set logging level (overrides LOG_LEVEL)
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Teacher plan HTML file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory the student plans are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Header template
    #[arg(short, long, env = "PLAN_TEMPLATE", default_value = "plan_style.html")]
    template: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// dsb_bot - DSBmobile substitution plan watcher
///
/// Polls DSBmobile for substitution plans, stores new ones in a git
/// repository and announces them on Discord.
#[derive(Parser, Debug)]
#[command(name = "dsb_bot")]
#[command(version)]
#[command(about = "DSBmobile substitution plan watcher")]
#[command(long_about = "dsb_bot polls DSBmobile for substitution plans, stores new plans in a git repository and announces them on Discord.

EXAMPLES:
    dsb_bot                                     # Run the bot with ./.env
    dsb_bot run -e /etc/dsb_bot.env -l debug    # Custom env file, debug logging
    dsb_bot convert lehrer.htm -o plans/        # Convert a teacher plan
    dsb_bot completions bash > dsb_bot.bash     # Generate bash completions

CONFIGURATION:
    DSB_USER, DSB_PASS, GIT_USER, GIT_TOKEN and GIT_REPO are required.
    DSB_TEACHER_USER/DSB_TEACHER_PASS, DISCORD_WEBHOOK_WARN, DISCORD_WEBHOOK_PLANS,
    DISCORD_PING_ROLE_ID, TEMP_THRESHOLD, REPO_DIR, LOG_DIR, LOG_LEVEL and
    PLAN_TEMPLATE are optional.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dsb_bot", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Run(args)) => run_bot(args).await,
        None => run_bot(RunArgs {
            env_file: PathBuf::from(".env"),
            log_level: None,
        })
        .await,
    }
}

async fn run_bot(args: RunArgs) -> Result<()> {
    // Variables may also come from the real environment
    let env_loaded = dotenv::from_path(&args.env_file).is_ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            BotLogger::init(LevelFilter::Info, None)?;
            error!("FATAL: configuration error: {}. Please check .env", e);
            return Err(e);
        }
    };

    let level: LogLevel = args.log_level.map(Into::into).unwrap_or_else(|| config.log_level.clone());
    let log_file = BotLogger::init(LevelFilter::from(&level), Some(&config.log_dir))?;
    info!("Logging initialized. New log file: {:?}", log_file);
    if !env_loaded {
        warn!("No env file at {:?}, using process environment", args.env_file);
    }

    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(
        config.discord.webhook_warn.clone(),
        config.discord.webhook_plans.clone(),
        &config.discord.ping_role_id,
    ));

    info!("Starting system monitor task...");
    tokio::spawn(system_monitor::monitor_system(notifier.clone(), config.temp_threshold));

    let git = GitManager::new(&config.git.user, &config.git.token, &config.git.repo, &config.repo_dir);
    let mut bot = SubstitutionBot::new(
        Arc::new(DsbClient::new(&config.dsb.user, &config.dsb.password)),
        notifier,
        PlanConverter::new(&config.template_path),
        config.plans_dir(),
    )
    .with_git(git);

    if let Some(teacher) = &config.dsb_teacher {
        bot = bot.with_teacher_source(
            Arc::new(DsbClient::new(&teacher.user, &teacher.password)),
            config.student_plans_dir(),
        );
    }

    bot.initialize().await.context("Bot start failed")?;

    tokio::select! {
        _ = bot.start() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping bot (interrupted by user)...");
        }
    }

    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let level: LogLevel = args.log_level.map(Into::into).unwrap_or_default();
    BotLogger::init(LevelFilter::from(&level), None)?;

    let teacher_html = FileManager::read_to_string(&args.input)?;
    let converter = PlanConverter::new(&args.template);
    let documents = converter.convert(&teacher_html);

    if documents.is_empty() {
        warn!("No student plans produced from {:?}", args.input);
        return Ok(());
    }

    FileManager::ensure_dir(&args.output_dir)?;
    for (index, document) in documents.iter().enumerate() {
        let path = args.output_dir.join(format!("student_{}.html", index + 1));
        FileManager::write_to_file(&path, document)?;
        info!("Written: {:?}", path);
    }

    Ok(())
}
