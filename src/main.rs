use anyhow::{bail, Context, Result};
use atlasform::atlas::{
    format_atlas_error, AtlasClient, CustomZoneMapping, CustomZoneMappingsRequest,
    GlobalClustersApi, ManagedNamespace,
};
use atlasform::config::Config;
use atlasform::provider::{
    CustomDbRoleModel, GlobalClusterConfigModel, Provider, ProviderError, ResourceState,
};
use atlasform::VERSION;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage MongoDB Atlas custom roles and global clusters declaratively
#[derive(Parser, Debug)]
#[command(name = "atlasform", version, about, long_about = None)]
struct Args {
    /// Atlas Admin API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Custom database role resource
    #[command(subcommand)]
    Role(RoleCommand),

    /// Global Clusters API calls
    #[command(subcommand)]
    GlobalCluster(GlobalClusterCommand),

    /// Global cluster config resource
    #[command(subcommand)]
    GlobalClusterConfig(GlobalClusterConfigCommand),

    /// Persist defaults to the config file
    Configure {
        #[arg(long)]
        project_id: Option<String>,
        #[arg(long)]
        public_key: Option<String>,
        #[arg(long)]
        private_key: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Create a role from a YAML/JSON resource file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Read a role by resource id
    Read {
        #[arg(long)]
        id: String,
    },
    /// Update a role: prior state file (from create/read) and new resource file
    Update {
        #[arg(long)]
        state: PathBuf,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a role by resource id
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Import an existing role as `{project_id}-{role_name}`
    Import { import_id: String },
}

#[derive(ClapArgs, Debug)]
struct ClusterTarget {
    /// Project (group) id; falls back to the configured project
    #[arg(short, long)]
    project: Option<String>,
    #[arg(short, long)]
    cluster: String,
}

#[derive(ClapArgs, Debug)]
struct NamespaceArgs {
    #[arg(long)]
    db: String,
    #[arg(long)]
    collection: String,
    #[arg(long)]
    shard_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum GlobalClusterCommand {
    /// Show managed namespaces and custom zone mappings
    Get {
        #[command(flatten)]
        target: ClusterTarget,
    },
    AddNamespace {
        #[command(flatten)]
        target: ClusterTarget,
        #[command(flatten)]
        namespace: NamespaceArgs,
    },
    DeleteNamespace {
        #[command(flatten)]
        target: ClusterTarget,
        #[command(flatten)]
        namespace: NamespaceArgs,
    },
    /// Add mappings given as LOCATION=ZONE
    AddZoneMappings {
        #[command(flatten)]
        target: ClusterTarget,
        #[arg(long = "mapping", value_parser = parse_mapping, required = true)]
        mappings: Vec<CustomZoneMapping>,
    },
    /// Remove all custom zone mappings
    DeleteZoneMappings {
        #[command(flatten)]
        target: ClusterTarget,
    },
}

#[derive(Subcommand, Debug)]
enum GlobalClusterConfigCommand {
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    Read {
        #[arg(long)]
        state: PathBuf,
    },
    Delete {
        #[arg(long)]
        state: PathBuf,
    },
    /// Import as `{project_id}-{cluster_name}`
    Import { import_id: String },
}

fn parse_mapping(value: &str) -> Result<CustomZoneMapping, String> {
    match value.split_once('=') {
        Some((location, zone)) if !location.is_empty() && !zone.is_empty() => {
            Ok(CustomZoneMapping {
                location: location.to_string(),
                zone: zone.to_string(),
            })
        }
        _ => Err(format!("expected LOCATION=ZONE, got `{value}`")),
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("atlasform {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("atlasform").join("atlasform.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".atlasform").join("atlasform.log");
    }
    PathBuf::from("atlasform.log")
}

/// Resource files may be YAML or JSON (YAML is a superset)
fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn lifecycle errors into user-facing messages
fn describe(err: ProviderError) -> anyhow::Error {
    if let ProviderError::Remote { context, source } = &err {
        return anyhow::anyhow!("{}: {}", context, format_atlas_error(source));
    }
    anyhow::Error::new(err)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    if let Some(base_url) = &args.base_url {
        config.base_url = Some(base_url.clone());
    }

    if let Command::Configure {
        project_id,
        public_key,
        private_key,
    } = args.command
    {
        // Only the flags given here are persisted; environment and --base-url stay out
        return Config::load_file()
            .with_stored_values(project_id, public_key, private_key)
            .save()
            .context("Failed to save configuration");
    }

    let base_url = config.effective_base_url();
    tracing::info!("Using Atlas API at {}", base_url);

    let client = AtlasClient::new(&base_url, config.credentials())
        .context("Failed to initialize Atlas client")?;
    let provider = Provider::new(client);

    match args.command {
        Command::Role(cmd) => run_role(&provider, cmd).await,
        Command::GlobalCluster(cmd) => run_global_cluster(&provider, &config, cmd).await,
        Command::GlobalClusterConfig(cmd) => run_global_cluster_config(&provider, cmd).await,
        Command::Configure { .. } => Ok(()),
    }
}

async fn run_role(provider: &Provider, cmd: RoleCommand) -> Result<()> {
    let roles = provider.custom_db_role();

    match cmd {
        RoleCommand::Create { file } => {
            let planned: CustomDbRoleModel = load_file(&file)?;
            print_json(&roles.create(&planned).await.map_err(describe)?)
        }
        RoleCommand::Read { id } => print_json(&roles.read(&id).await.map_err(describe)?),
        RoleCommand::Update { state, file } => {
            let prior: ResourceState<CustomDbRoleModel> = load_file(&state)?;
            let planned: CustomDbRoleModel = load_file(&file)?;
            if planned.project_id != prior.model.project_id
                || planned.role_name != prior.model.role_name
            {
                bail!("project_id and role_name cannot change in place; delete and create instead");
            }
            let updated = roles
                .update(&prior.id, &prior.model, &planned)
                .await
                .map_err(describe)?;
            print_json(&updated)
        }
        RoleCommand::Delete { id } => {
            roles.delete(&id).await.map_err(describe)?;
            eprintln!("Deleted custom db role {}", id);
            Ok(())
        }
        RoleCommand::Import { import_id } => {
            print_json(&roles.import(&import_id).await.map_err(describe)?)
        }
    }
}

async fn run_global_cluster(
    provider: &Provider,
    config: &Config,
    cmd: GlobalClusterCommand,
) -> Result<()> {
    let api = provider.client().global_clusters();

    let project = |target: &ClusterTarget| -> Result<String> {
        config
            .effective_project(target.project.as_deref())
            .context("No project configured. Use --project or set MONGODB_ATLAS_PROJECT_ID")
    };

    let result = match cmd {
        GlobalClusterCommand::Get { target } => {
            api.get(&project(&target)?, &target.cluster).await
        }
        GlobalClusterCommand::AddNamespace { target, namespace } => {
            let ns = ManagedNamespace {
                db: namespace.db,
                collection: namespace.collection,
                custom_shard_key: namespace.shard_key,
            };
            api.add_managed_namespace(&project(&target)?, &target.cluster, Some(&ns))
                .await
        }
        GlobalClusterCommand::DeleteNamespace { target, namespace } => {
            let ns = ManagedNamespace {
                db: namespace.db,
                collection: namespace.collection,
                custom_shard_key: None,
            };
            api.delete_managed_namespace(&project(&target)?, &target.cluster, Some(&ns))
                .await
        }
        GlobalClusterCommand::AddZoneMappings { target, mappings } => {
            let request = CustomZoneMappingsRequest {
                custom_zone_mappings: mappings,
            };
            api.add_custom_zone_mappings(&project(&target)?, &target.cluster, Some(&request))
                .await
        }
        GlobalClusterCommand::DeleteZoneMappings { target } => {
            api.delete_custom_zone_mappings(&project(&target)?, &target.cluster)
                .await
        }
    };

    match result {
        Ok((cluster, response)) => {
            tracing::debug!("Atlas answered {}", response.status);
            print_json(&cluster)
        }
        Err(e) => bail!(format_atlas_error(&e)),
    }
}

async fn run_global_cluster_config(
    provider: &Provider,
    cmd: GlobalClusterConfigCommand,
) -> Result<()> {
    let configs = provider.global_cluster_config();

    match cmd {
        GlobalClusterConfigCommand::Create { file } => {
            let planned: GlobalClusterConfigModel = load_file(&file)?;
            print_json(&configs.create(&planned).await.map_err(describe)?)
        }
        GlobalClusterConfigCommand::Read { state } => {
            let prior: ResourceState<GlobalClusterConfigModel> = load_file(&state)?;
            print_json(&configs.read(&prior).await.map_err(describe)?)
        }
        GlobalClusterConfigCommand::Delete { state } => {
            let prior: ResourceState<GlobalClusterConfigModel> = load_file(&state)?;
            configs.delete(&prior).await.map_err(describe)?;
            eprintln!("Deleted global cluster config {}", prior.id);
            Ok(())
        }
        GlobalClusterConfigCommand::Import { import_id } => {
            print_json(&configs.import(&import_id).await.map_err(describe)?)
        }
    }
}
