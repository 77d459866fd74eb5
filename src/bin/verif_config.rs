use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use verif_config::batch::SystemBatchRunner;
use verif_config::config::ParsedConfig;
use verif_config::deriver::ConfigDeriver;
use verif_config::env::VerifEnv;
use verif_config::error::VerifError;
use verif_config::output::{JsonOutput, OutputMode, TextOutput};
use verif_config::regrid::RegridLauncher;

#[derive(Parser)]
#[command(name = "verif-config")]
#[command(about = "Prepare case and experiment configuration for spatial verification and run the regrid step")]
#[command(version, author)]
struct Cli {
    /// Experiment configuration (YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Write config/Case/config_<case>.yaml")]
    Case,
    #[command(about = "Write config/exp/config_<exp>.yaml")]
    Exp,
    #[command(about = "Write both the case and the experiment configuration")]
    Setup,
    #[command(about = "Run the verification tool's regrid step")]
    Regrid,
    #[command(about = "Show derived names, paths and cycles without writing anything")]
    Plan(PlanArgs),
}

#[derive(Args)]
struct PlanArgs {
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<VerifError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &VerifError) -> u8 {
    match error {
        VerifError::MissingEnv(_)
        | VerifError::MissingConfigKey(_)
        | VerifError::InvalidConfigValue { .. }
        | VerifError::ConfigRead(_)
        | VerifError::ConfigParse(_)
        | VerifError::MalformedDate(_)
        | VerifError::MalformedFrequency(_)
        | VerifError::EmptyTimeSeries(_)
        | VerifError::UnknownModel(_)
        | VerifError::TemplateNotFound(_) => 2,
        VerifError::SubprocessFailure { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ParsedConfig::resolve(cli.config.as_deref())?;
    let env = VerifEnv::from_env()?;
    let deriver = ConfigDeriver::new(&config, env)?;

    match cli.command {
        Commands::Case => {
            let case = deriver.write_case_config()?;
            println!("{case}");
        }
        Commands::Exp => {
            let exp = deriver.write_exp_config()?;
            println!("{exp}");
        }
        Commands::Setup => {
            let case = deriver.write_case_config()?;
            let exp = deriver.write_exp_config()?;
            println!("{case}");
            println!("{exp}");
        }
        Commands::Regrid => {
            RegridLauncher::new(&deriver, SystemBatchRunner::new()).execute()?;
        }
        Commands::Plan(args) => {
            let mode = if args.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            };
            let plan = deriver.plan()?;
            match mode {
                OutputMode::Json => JsonOutput::print_plan(&plan).into_diagnostic()?,
                OutputMode::Text => TextOutput::print_plan(&plan).into_diagnostic()?,
            }
        }
    }
    Ok(())
}
