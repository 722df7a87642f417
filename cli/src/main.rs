//! votecheck: run dual-officer manual verifications from a terminal.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use votecheck_identity::{
    Credential, DirectoryAuthenticator, DirectoryEntry, DirectoryIdentityProvider, HashParams,
    IdentityProvider, OfficerAuthenticator, Operator, PasswordDirectory, PasswordHash,
    SessionContext, SimulatedAuthenticator,
};
use votecheck_store::{get_verification_record, list_verification_records, RecordStore};
use votecheck_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use votecheck_types::{Decision, VerificationMethod, VoterCase, VoterId};
use votecheck_utils::LogFormat;
use votecheck_verification::{ManualVerificationWorkflow, WorkflowState};

use crate::config::{AppConfig, AuthMode};

#[derive(Parser)]
#[command(name = "votecheck", about = "Dual-officer manual voter verification")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VOTECHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the record store.
    #[arg(long, env = "VOTECHECK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTECHECK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTECHECK_LOG_LEVEL")]
    log_level: Option<String>,

    /// How officer credentials are checked.
    #[arg(long, value_enum, env = "VOTECHECK_AUTH_MODE")]
    auth_mode: Option<AuthMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a manual verification for one voter case.
    Verify(VerifyArgs),

    /// Inspect stored verification records.
    #[command(name = "record")]
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Hash a password and print a directory entry for it.
    HashPassword {
        /// Officer id or operator email the entry is for.
        #[arg(long)]
        id: String,

        #[arg(long, env = "VOTECHECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(clap::Args)]
struct VerifyArgs {
    /// TOML file describing the voter case.
    #[arg(long)]
    case: PathBuf,

    /// Email of the signed-in dashboard operator.
    #[arg(long, env = "VOTECHECK_OPERATOR")]
    operator: String,

    #[arg(long, env = "VOTECHECK_OPERATOR_PASSWORD", hide_env_values = true)]
    operator_password: String,

    #[arg(long)]
    officer_one: String,

    #[arg(long, env = "VOTECHECK_OFFICER_ONE_PASSWORD", hide_env_values = true)]
    officer_one_password: String,

    #[arg(long)]
    officer_two: String,

    #[arg(long, env = "VOTECHECK_OFFICER_TWO_PASSWORD", hide_env_values = true)]
    officer_two_password: String,

    /// "approve" or "reject".
    #[arg(long)]
    decision: Decision,

    /// "id_documents", "biometric_override" or "alternative".
    #[arg(long, default_value = "id_documents")]
    method: VerificationMethod,

    #[arg(long)]
    notes: String,
}

#[derive(clap::Subcommand)]
enum RecordAction {
    /// Print the record for one voter.
    Show { voter_id: VoterId },
    /// Print every stored record.
    List,
}

impl Cli {
    /// File settings (or defaults) with flags and env vars applied on top.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_toml_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(mode) = self.auth_mode {
            config.auth_mode = mode;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    votecheck_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Verify(args) => verify(&config, args).await,
        Command::Record { action } => {
            let env = open_store(&config)?;
            let store = env.record_store();
            match action {
                RecordAction::Show { voter_id } => {
                    let record = get_verification_record(&store, &voter_id)
                        .await
                        .with_context(|| format!("no verification record for voter {voter_id}"))?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                RecordAction::List => {
                    let records = list_verification_records(&store).await?;
                    for record in &records {
                        println!("{}", serde_json::to_string(record)?);
                    }
                    tracing::info!(count = records.len(), "listed verification records");
                }
            }
            Ok(())
        }
        Command::HashPassword { id, password } => {
            let entry = DirectoryEntry {
                id,
                password: PasswordHash::create(&Credential::new(password), HashParams::default())?,
            };
            print!("{}", entry.to_toml_string()?);
            Ok(())
        }
    }
}

async fn verify(config: &AppConfig, args: VerifyArgs) -> anyhow::Result<()> {
    let case = load_case(&args.case)?;
    let session = sign_in(config, &args.operator, Credential::new(args.operator_password)).await?;
    let authenticator = officer_authenticator(config)?;
    let env = open_store(config)?;
    let store: Arc<dyn RecordStore> = Arc::new(env.record_store());

    let mut workflow = ManualVerificationWorkflow::new(session, case, authenticator, store)
        .with_options(config.workflow_options());

    let mut rx = workflow.watch();
    let printer = tokio::spawn(async move {
        let mut shown = 0;
        while rx.changed().await.is_ok() {
            let view = rx.borrow_and_update().clone();
            if view.state == WorkflowState::Processing && view.progress > shown {
                shown = view.progress;
                println!("Processing verification... {shown}%");
            }
        }
    });

    workflow
        .submit_officer_one(&args.officer_one, Credential::new(args.officer_one_password))
        .await?;
    println!("Officer {} verified", args.officer_one.trim());
    workflow
        .submit_officer_two(&args.officer_two, Credential::new(args.officer_two_password))
        .await?;
    println!("Officer {} verified", args.officer_two.trim());

    workflow.set_decision(args.decision)?;
    workflow.set_method(args.method)?;
    workflow.set_notes(args.notes)?;
    let receipt = workflow.complete_verification().await?;

    drop(workflow);
    printer.await?;
    println!("{}", receipt.summary());
    Ok(())
}

/// Read a voter case from a TOML file.
fn load_case(path: &Path) -> anyhow::Result<VoterCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read case file {}", path.display()))?;
    let case: VoterCase = toml::from_str(&content)
        .with_context(|| format!("invalid case file {}", path.display()))?;
    if !case.needs_manual_check() {
        tracing::info!(voter = %case.id, "case was verified automatically, recording an override");
    }
    Ok(case)
}

async fn sign_in(
    config: &AppConfig,
    email: &str,
    password: Credential,
) -> anyhow::Result<SessionContext> {
    match config.auth_mode {
        AuthMode::Directory => {
            let operators = PasswordDirectory::from_toml_file(&config.operators_file)?;
            let provider = DirectoryIdentityProvider::new(operators);
            provider.sign_in(email, &password).await?;
            Ok(SessionContext::require(&provider)?)
        }
        AuthMode::Simulated => {
            tracing::warn!(operator = email, "simulated mode, operator sign-in skipped");
            Ok(SessionContext::for_operator(Operator::new(email)))
        }
    }
}

fn officer_authenticator(config: &AppConfig) -> anyhow::Result<Arc<dyn OfficerAuthenticator>> {
    Ok(match config.auth_mode {
        AuthMode::Directory => Arc::new(DirectoryAuthenticator::new(
            PasswordDirectory::from_toml_file(&config.officers_file)?,
        )),
        AuthMode::Simulated => Arc::new(SimulatedAuthenticator::new(
            config.simulated_auth_delay(),
        )),
    })
}

/// Open the LMDB store after checking the directory and its contents.
fn open_store(config: &AppConfig) -> anyhow::Result<LmdbEnvironment> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
    let report = check_integrity(&env)?;
    if report.is_healthy() {
        tracing::info!(entries = report.total_entries, "record store integrity ok");
    } else {
        for error in &report.errors {
            tracing::warn!("integrity: {error}");
        }
    }
    Ok(env)
}
