use clap::{Args, Parser, Subcommand};
use ppc::cli::{
    compress_file, decompress_file, gateway_for, pull_file, push_file, show_info,
    CompressOptions, DecompressOptions, DEFAULT_NOTES,
};
use ppc::pipeline::{KdfParams, DEFAULT_LEVEL};
use ppc::remote::{Backend, RemoteConfig, DEFAULT_DAEMON_API, DEFAULT_DAEMON_GATEWAY};
use ppc::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use zeroize::Zeroizing;

/// Version info from build.rs
const VERSION: &str = env!("PPC_VERSION");
const BUILD: &str = env!("PPC_BUILD");
const PROFILE: &str = env!("PPC_PROFILE");
const GIT_HASH: &str = env!("PPC_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH)
    })
}

#[derive(Parser)]
#[command(name = "ppc")]
#[command(author, about = "Pied Piper universal container: compress + encrypt any file", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Log filter (e.g. debug, ppc=trace); falls back to RUST_LOG, then warn
    #[arg(long, global = true, env = "PPC_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress and encrypt a file into a .ppc container
    #[command(alias = "c")]
    Compress {
        /// File to pack
        input: PathBuf,

        /// Output container (default: INPUT with a .ppc extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase (prompted when omitted)
        #[arg(short, long, env = "PPC_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,

        /// zstd level (1-22)
        #[arg(long, default_value_t = DEFAULT_LEVEL)]
        level: i32,

        /// Upload the container after writing it
        #[arg(long, default_value = "none", value_parser = parse_upload)]
        upload: Upload,

        /// Original filename to record instead of INPUT's name
        #[arg(long)]
        name: Option<String>,

        /// Free-form notes stored in the header
        #[arg(long, default_value = DEFAULT_NOTES)]
        notes: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Decrypt and decompress a container
    #[command(alias = "d")]
    Decompress {
        /// Container to open
        container: PathBuf,

        /// Output file (default: the original filename from the header)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase (prompted when omitted)
        #[arg(short, long, env = "PPC_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },

    /// Show a container's header without decrypting it
    #[command(alias = "i")]
    Inspect {
        /// Container to inspect
        container: PathBuf,
    },

    /// Print the public gateway URL for a content id
    Gateway {
        cid: String,

        /// web3, pinata or daemon
        #[arg(long, default_value = "web3", value_parser = parse_backend)]
        service: Backend,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Add a container to the local IPFS daemon
    Push {
        file: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Fetch a content id from the local IPFS daemon
    Pull {
        cid: String,
        output: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[derive(Args)]
struct RemoteArgs {
    #[arg(long, env = "WEB3_STORAGE_TOKEN", hide_env_values = true)]
    web3_token: Option<String>,

    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pinata_jwt: Option<String>,

    /// Local daemon RPC endpoint
    #[arg(long, env = "IPFS_API_URL", default_value = DEFAULT_DAEMON_API)]
    ipfs_api: String,

    /// Local daemon gateway
    #[arg(long, env = "IPFS_GATEWAY_URL", default_value = DEFAULT_DAEMON_GATEWAY)]
    ipfs_gateway: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "PPC_HTTP_TIMEOUT", default_value_t = 120)]
    http_timeout: u64,
}

impl From<RemoteArgs> for RemoteConfig {
    fn from(args: RemoteArgs) -> Self {
        RemoteConfig {
            web3_token: args.web3_token,
            pinata_jwt: args.pinata_jwt,
            daemon_api: args.ipfs_api,
            daemon_gateway: args.ipfs_gateway,
            timeout: Duration::from_secs(args.http_timeout),
        }
    }
}

/// `--upload` target; `none` disables uploading
#[derive(Clone, Copy)]
struct Upload(Option<Backend>);

fn parse_upload(s: &str) -> std::result::Result<Upload, String> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Upload(None)),
        "web3" => Ok(Upload(Some(Backend::Web3))),
        "pinata" => Ok(Upload(Some(Backend::Pinata))),
        other => Err(format!("unknown upload target: {} (none, web3, pinata)", other)),
    }
}

fn parse_backend(s: &str) -> std::result::Result<Backend, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logging(level: Option<&str>) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_passphrase(passphrase: Option<String>) -> Result<Zeroizing<String>> {
    match passphrase {
        Some(p) => Ok(Zeroizing::new(p)),
        None => {
            let p = rpassword::prompt_password("Passphrase: ")?;
            Ok(Zeroizing::new(p))
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compress {
            input,
            output,
            passphrase,
            level,
            upload,
            name,
            notes,
            remote,
        } => {
            let passphrase = get_passphrase(passphrase)?;
            let options = CompressOptions {
                passphrase: (*passphrase).clone(),
                level,
                name,
                notes: Some(notes),
                upload: upload.0,
                remote: remote.into(),
                kdf: KdfParams::default(),
            };

            let report = compress_file(&input, output.as_deref(), &options)?;
            println!(
                "Compressed {} ({} bytes, {}) to {} ({} bytes, level {})",
                input.display(),
                report.original_bytes,
                report.mime,
                report.output.display(),
                report.container_bytes,
                report.level
            );
            if let Some(upload) = report.upload {
                println!("Uploaded to {}: {}", upload.backend, upload.cid);
                println!("Gateway: {}", upload.url);
            }
            Ok(())
        }

        Commands::Decompress {
            container,
            output,
            passphrase,
        } => {
            let passphrase = get_passphrase(passphrase)?;
            let options = DecompressOptions {
                passphrase: (*passphrase).clone(),
            };

            let report = decompress_file(&container, output.as_deref(), &options)?;
            println!(
                "Restored {} ({} bytes, {})",
                report.output.display(),
                report.bytes,
                report.mime
            );
            Ok(())
        }

        Commands::Inspect { container } => {
            print!("{}", show_info(&container)?);
            Ok(())
        }

        Commands::Gateway {
            cid,
            service,
            remote,
        } => {
            println!("{}", gateway_for(&cid, service, &remote.into())?);
            Ok(())
        }

        Commands::Push { file, remote } => {
            let report = push_file(&file, &remote.into())?;
            println!("Pushed {}: {}", file.display(), report.cid);
            println!("Gateway: {}", report.url);
            Ok(())
        }

        Commands::Pull {
            cid,
            output,
            remote,
        } => {
            pull_file(&cid, &output, &remote.into())?;
            println!("Pulled {} to {}", cid, output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("ppc {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if Cli::command().print_help().is_err() {
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_logging(cli.log_level.as_deref());

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
