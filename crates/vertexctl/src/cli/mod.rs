//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};

/// Command-line client for Vertex AI
#[derive(Parser, Debug)]
#[command(name = "vertexctl")]
#[command(
    version,
    about = "Vertex AI management CLI for Ray clusters, vector search indexes, extensions and example stores"
)]
#[command(long_about = "
Vertex AI management CLI for Ray clusters, vector search indexes, extensions and example stores

EXAMPLES:
    # Set up a profile
    vertexctl profile set dev --project my-project --location us-central1 --prompt-token

    # List Ray clusters as a table
    vertexctl cluster list

    # Get JSON output for scripting
    vertexctl index list -o json

    # Filter output with JMESPath
    vertexctl cluster list -q '[?state==`RUNNING`].cluster_resource_name'

    # Wait on an operation started elsewhere
    vertexctl operation wait projects/p/locations/us-central1/operations/123

For more help on a specific command, run:
    vertexctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "VERTEXCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "VERTEXCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables for listings, JSON for single resources
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    Profile(ProfileCommands),

    /// Ray on Vertex cluster lifecycle
    #[command(subcommand, visible_alias = "ray")]
    Cluster(ClusterCommands),

    /// Vector search indexes
    #[command(subcommand)]
    Index(IndexCommands),

    /// Extension registry
    #[command(subcommand, visible_alias = "ext")]
    Extension(ExtensionCommands),

    /// Example store contents
    #[command(subcommand)]
    Example(ExampleCommands),

    /// Model monitoring jobs
    #[command(subcommand)]
    Job(JobCommands),

    /// Long-running operations
    #[command(subcommand, visible_alias = "op")]
    Operation(OperationCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    # Token read from the environment at run time
    vertexctl profile set dev --project my-project --access-token '${GOOGLE_OAUTH_ACCESS_TOKEN}'

    # Prompt for the token instead of passing it on the command line
    vertexctl profile set prod --project prod-project --location europe-west4 --prompt-token

    # Point at a private endpoint and bill a different project
    vertexctl profile set psc --project my-project \\
        --api-endpoint https://us-central1-aiplatform.p.example.internal \\
        --quota-project billing-project
")]
    Set {
        /// Profile name
        name: String,

        /// Google Cloud project id
        #[arg(long)]
        project: String,

        /// Region for regional endpoints
        #[arg(long, default_value = vertexctl_core::client::DEFAULT_LOCATION)]
        location: String,

        /// OAuth access token, `${ENV}` reference or `keyring:` reference
        #[arg(long, conflicts_with = "prompt_token")]
        access_token: Option<String>,

        /// Prompt for the access token without echoing it
        #[arg(long)]
        prompt_token: bool,

        /// Endpoint override
        #[arg(long)]
        api_endpoint: Option<String>,

        /// Project billed for quota (`x-goog-user-project`)
        #[arg(long)]
        quota_project: Option<String>,

        /// Store the access token in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(name = "default", visible_alias = "use")]
    Default {
        /// Profile name to use when --profile is not given
        name: String,
    },
}

/// Polling controls shared by commands that wait on operations
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Give up waiting after this many seconds (the operation keeps running)
    #[arg(long, value_name = "SECONDS")]
    pub wait_timeout: Option<u64>,
}

/// Options for commands whose operation may be awaited or returned immediately
#[derive(Args, Debug, Clone, Default)]
pub struct AsyncOperationArgs {
    /// Wait for the operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds (the operation keeps running)
    #[arg(long, value_name = "SECONDS", requires = "wait")]
    pub wait_timeout: Option<u64>,
}

/// Ray cluster commands
#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    /// Create a cluster and wait until it is provisioned
    #[command(after_help = "EXAMPLES:
    # One head node and two CPU workers
    vertexctl cluster create --name demo --worker-count 2

    # GPU workers with a specific Ray version
    vertexctl cluster create --name gpu --worker-machine-type n1-standard-8 \\
        --worker-accelerator NVIDIA_TESLA_T4 --worker-accelerator-count 1 \\
        --ray-version 2.33 --python-version 3.10
")]
    Create {
        /// Cluster id; generated from the current time when omitted
        #[arg(long)]
        name: Option<String>,

        /// Head node machine type
        #[arg(long)]
        head_machine_type: Option<String>,

        /// Worker machine type
        #[arg(long)]
        worker_machine_type: Option<String>,

        /// Number of worker replicas
        #[arg(long, default_value = "1")]
        worker_count: i64,

        /// Worker accelerator type, e.g. NVIDIA_TESLA_T4
        #[arg(long, requires = "worker_accelerator_count")]
        worker_accelerator: Option<String>,

        /// Accelerators per worker
        #[arg(long, requires = "worker_accelerator")]
        worker_accelerator_count: Option<i32>,

        /// Autoscale workers between MIN and MAX replicas
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        autoscaling: Option<Vec<i64>>,

        /// Ray version of the prebuilt image
        #[arg(long)]
        ray_version: Option<String>,

        /// Python version of the prebuilt image
        #[arg(long)]
        python_version: Option<String>,

        /// VPC network to peer with
        #[arg(long)]
        network: Option<String>,

        /// Service account the nodes run as
        #[arg(long)]
        service_account: Option<String>,

        /// Cloud KMS key for customer-managed encryption
        #[arg(long)]
        encryption_key: Option<String>,

        /// Label as KEY=VALUE (repeatable)
        #[arg(long = "label", value_name = "KEY=VALUE")]
        labels: Vec<String>,

        /// Disable Ray metrics collection
        #[arg(long)]
        no_metrics: bool,

        /// Disable Ray log export
        #[arg(long)]
        no_logging: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Show one cluster
    Get {
        /// Cluster id or full resource name
        name: String,
    },

    /// List clusters in the profile's project and location
    #[command(visible_alias = "ls")]
    List,

    /// Resize worker pools
    #[command(after_help = "EXAMPLES:
    # Scale the only worker pool to four replicas
    vertexctl cluster update demo --worker-count 4

    # Two worker pools, resized in order
    vertexctl cluster update demo --worker-count 2 --worker-count 0
")]
    Update {
        /// Cluster id or full resource name
        name: String,

        /// New replica count, one per worker pool in order
        #[arg(long, required = true)]
        worker_count: Vec<i64>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a cluster
    #[command(visible_alias = "rm")]
    Delete {
        /// Cluster id or full resource name
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        force: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Dashboard address for Ray job submission
    Dashboard {
        /// Cluster id, full resource name, or vertex_ray:// address
        name: String,
    },
}

/// Vector search index commands
#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// List indexes
    #[command(visible_alias = "ls")]
    List {
        /// Server-side filter expression
        #[arg(long)]
        filter: Option<String>,

        /// Results per page
        #[arg(long)]
        page_size: Option<i32>,
    },

    /// Show one index
    Get {
        /// Index id or full resource name
        name: String,
    },

    /// Delete an index
    #[command(visible_alias = "rm")]
    Delete {
        /// Index id or full resource name
        name: String,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },
}

/// Extension registry commands
#[derive(Subcommand, Debug)]
pub enum ExtensionCommands {
    /// Import an extension from a JSON or YAML manifest file
    #[command(after_help = "EXAMPLES:
    # extension.yaml:
    #   displayName: Code Interpreter
    #   manifest:
    #     name: code_interpreter_tool
    #     description: Google Code Interpreter Extension
    #     apiSpec:
    #       openApiGcsUri: gs://vertex-extension-public/code_interpreter.yaml
    #     authConfig:
    #       authType: GOOGLE_SERVICE_ACCOUNT_AUTH
    vertexctl extension import --file extension.yaml --wait
")]
    Import {
        /// Extension definition (JSON, or YAML by extension)
        #[arg(long, short)]
        file: String,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },

    /// Show one extension
    Get {
        /// Extension id or full resource name
        name: String,
    },

    /// List extensions
    #[command(visible_alias = "ls")]
    List {
        /// Server-side filter expression
        #[arg(long)]
        filter: Option<String>,
    },

    /// Delete an extension
    #[command(visible_alias = "rm")]
    Delete {
        /// Extension id or full resource name
        name: String,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },
}

/// Example store commands
#[derive(Subcommand, Debug)]
pub enum ExampleCommands {
    /// Create or update examples from a file
    #[command(after_help = "EXAMPLES:
    # examples.json holds an array of examples, or {\"examples\": [...]}
    vertexctl example upsert --store 123 --file examples.json --overwrite
")]
    Upsert {
        /// Example store id or full resource name
        #[arg(long)]
        store: String,

        /// Examples (JSON, or YAML by extension)
        #[arg(long, short)]
        file: String,

        /// Replace examples whose ids already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Fetch examples, optionally by id
    Fetch {
        /// Example store id or full resource name
        #[arg(long)]
        store: String,

        /// Example id (repeatable)
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,

        /// Results per page
        #[arg(long)]
        page_size: Option<i32>,
    },

    /// Remove examples by id
    #[command(visible_alias = "rm")]
    Remove {
        /// Example store id or full resource name
        #[arg(long)]
        store: String,

        /// Example id (repeatable)
        #[arg(long = "id", value_name = "ID", required = true)]
        ids: Vec<String>,
    },
}

/// Model monitoring job commands
#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// Search monitoring stats anomalies for a deployed model
    #[command(after_help = "EXAMPLES:
    vertexctl job search-anomalies --job 4567 --deployed-model-id 890 --feature age

    # Limit to a time window (RFC 3339)
    vertexctl job search-anomalies --job 4567 --deployed-model-id 890 \\
        --start 2024-05-01T00:00:00Z --end 2024-05-08T00:00:00Z
")]
    SearchAnomalies {
        /// Monitoring job id or full resource name
        #[arg(long)]
        job: String,

        /// Deployed model id
        #[arg(long)]
        deployed_model_id: String,

        /// Restrict to one feature
        #[arg(long)]
        feature: Option<String>,

        /// Results per page
        #[arg(long)]
        page_size: Option<i32>,

        /// Window start (RFC 3339)
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Window end (RFC 3339)
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
}

/// Operation commands
#[derive(Subcommand, Debug)]
pub enum OperationCommands {
    /// Show the current state of an operation
    Get {
        /// Full operation name
        name: String,

        /// Route through the v1beta1 surface (extensions, example stores)
        #[arg(long)]
        beta: bool,
    },

    /// Wait for an operation to finish and print its response
    Wait {
        /// Full operation name
        name: String,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Route through the v1beta1 surface (extensions, example stores)
        #[arg(long)]
        beta: bool,
    },

    /// Request cancellation of an operation
    Cancel {
        /// Full operation name
        name: String,

        /// Route through the v1beta1 surface (extensions, example stores)
        #[arg(long)]
        beta: bool,
    },
}
