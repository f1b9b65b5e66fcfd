use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cam_engine::cli::{
    handle_calculate, handle_export, handle_finalize, handle_history, handle_list, handle_show,
    handle_statement, ExportFormat,
};
use cam_engine::config::{paths::CamPaths, settings::Settings};
use cam_engine::storage::Storage;

#[derive(Parser)]
#[command(
    name = "camrec",
    version,
    about = "CAM reconciliation and allocation for commercial properties",
    long_about = "camrec calculates each tenant's share of a property's common area \
                  maintenance expenses for a period, applying exclusions, admin fees, \
                  base-year and expense-stop credits, CAM caps, gross-up and proration \
                  as each lease specifies."
)]
struct Cli {
    /// Log each allocation step
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory
    #[arg(long, global = true, env = "CAM_ENGINE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or recalculate a draft from a request file
    #[command(alias = "calc")]
    Calculate {
        /// Path to the calculation request (JSON)
        input: PathBuf,
        /// Recalculate this existing draft
        #[arg(long)]
        id: Option<String>,
        /// Fail unless the draft is still at this version
        #[arg(long)]
        expected_version: Option<u64>,
    },

    /// Finalize a draft
    Finalize {
        /// Reconciliation ID or prefix
        id: String,
        #[arg(long)]
        expected_version: Option<u64>,
    },

    /// Show a reconciliation
    Show {
        /// Reconciliation ID or prefix
        id: String,
        /// Print the full reconciliation report
        #[arg(short, long)]
        report: bool,
    },

    /// List reconciliations
    #[command(alias = "ls")]
    List {
        /// Only reconciliations for this property
        #[arg(short, long)]
        property: Option<String>,
    },

    /// Print one tenant's allocation statement
    Statement {
        /// Reconciliation ID or prefix
        id: String,
        /// Tenant ID or name
        tenant: String,
    },

    /// Export a reconciliation
    Export {
        /// Reconciliation ID or prefix
        id: String,
        /// Output file path
        output: PathBuf,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// With --format csv, export the category breakdown instead
        #[arg(long)]
        categories: bool,
    },

    /// Show the audit history of a reconciliation
    History {
        /// Reconciliation ID or prefix
        id: String,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let paths = match cli.data_dir {
        Some(dir) => CamPaths::with_base_dir(dir),
        None => CamPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?.with_audit(settings.audit_enabled);
    storage.load_all()?;

    match cli.command {
        Some(Commands::Calculate {
            input,
            id,
            expected_version,
        }) => handle_calculate(&storage, &settings, input, id, expected_version)?,
        Some(Commands::Finalize {
            id,
            expected_version,
        }) => handle_finalize(&storage, &id, expected_version)?,
        Some(Commands::Show { id, report }) => handle_show(&storage, &settings, &id, report)?,
        Some(Commands::List { property }) => handle_list(&storage, property)?,
        Some(Commands::Statement { id, tenant }) => handle_statement(&storage, &id, &tenant)?,
        Some(Commands::Export {
            id,
            output,
            format,
            categories,
        }) => handle_export(&storage, &settings, &id, output, format, categories)?,
        Some(Commands::History { id }) => handle_history(&storage, &id)?,
        Some(Commands::Config) => {
            println!("camrec Configuration");
            println!("====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Allocation method:  {}", settings.default_allocation_method);
            println!("  Credit precedence:  {}", settings.default_credit_precedence);
            println!("  Variance tolerance: {}", settings.variance_tolerance);
            println!("  Audit enabled:      {}", settings.audit_enabled);
        }
        None => {
            println!("camrec - CAM reconciliation and allocation");
            println!();
            println!("Run 'camrec --help' for usage information.");
        }
    }

    Ok(())
}
