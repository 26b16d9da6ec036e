mod cli;

use ai_sentinel::{
    build_guard, load_config, CliOutput, ConfigOverrides, Metadata, ProviderType, SentinelConfig,
    SentinelError,
};
use clap::{CommandFactory, Parser};
use cli::{load_text, validate_file_exists, validate_non_empty, validate_timeout, write_output};
use std::{path::PathBuf, process};

/// Exit code for a credential probe the backend rejected
const INVALID_CREDENTIALS_EXIT_CODE: i32 = 5;

#[derive(Parser, Debug, Clone)]
#[command(name = "ai-sentinel")]
#[command(about = "LLM-as-a-judge toxicity guard with multi-provider support", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Config file (JSON or TOML)
    /// Note: any CLI argument overrides the corresponding config file value
    #[arg(long, short = 'c', value_parser = validate_file_exists)]
    config_file: Option<PathBuf>,

    /// Backend type (inferred from --base-url when omitted)
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Model name, or deployment name for Azure OpenAI
    #[arg(long, short = 'm', value_parser = validate_non_empty)]
    model: Option<String>,

    /// Endpoint or base URL of the backend
    #[arg(long, value_parser = validate_non_empty)]
    base_url: Option<String>,

    /// API key for authentication (direct value)
    #[arg(long, conflicts_with = "api_key_name")]
    api_key: Option<String>,

    /// Environment variable name containing the API key
    #[arg(long, conflicts_with = "api_key")]
    api_key_name: Option<String>,

    /// Azure OpenAI API version
    #[arg(long)]
    api_version: Option<String>,

    /// Request timeout in seconds (must be > 0)
    #[arg(long = "timeout", value_parser = validate_timeout)]
    timeout_secs: Option<f64>,

    /// Replacement moderation system prompt
    #[arg(long, value_parser = validate_file_exists)]
    system_prompt_file: Option<PathBuf>,

    /// Text to assess
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// File containing the text to assess
    #[arg(long, short = 'f', conflicts_with = "text", value_parser = validate_file_exists)]
    text_file: Option<PathBuf>,

    /// Only check that the backend accepts the configured credentials
    #[arg(long, conflicts_with_all = ["text", "text_file", "describe"])]
    check_credentials: bool,

    /// Print the configured client (never includes credentials)
    #[arg(long, conflicts_with_all = ["text", "text_file"])]
    describe: bool,

    /// Enable verbose logging (DEBUG level)
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging output
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,

    /// Write output to file instead of stdout
    /// Uses atomic writes (temp file + rename) and creates parent directories
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ProviderArg {
    #[value(name = "azure_openai", alias = "azure")]
    AzureOpenAI,
    #[value(name = "google_gemini", alias = "gemini")]
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Vllm,
    Ollama,
}

impl From<ProviderArg> for ProviderType {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::AzureOpenAI => ProviderType::AzureOpenAI,
            ProviderArg::Gemini => ProviderType::Gemini,
            ProviderArg::OpenAI => ProviderType::OpenAI,
            ProviderArg::Vllm => ProviderType::Vllm,
            ProviderArg::Ollama => ProviderType::Ollama,
        }
    }
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider.map(Into::into),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            api_key_name: self.api_key_name.clone(),
            api_version: self.api_version.clone(),
            timeout_secs: self.timeout_secs,
            system_prompt_file: self.system_prompt_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    if std::env::args().len() == 1 {
        let _ = Args::command().print_help(); // Ignore broken pipe errors
        println!();
        process::exit(0);
    }

    let args = Args::parse();

    // quiet: no logs, verbose: DEBUG+, default: INFO+
    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.args()
            )
        })
        .init();

    let output_path = args.output.clone();

    let (output, exit_code) = match run(args).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("{e}");
            (
                CliOutput::error(e.code().to_string(), e.to_string(), Metadata::unknown()),
                e.exit_code(),
            )
        }
    };

    if let Err(io_err) = write_output(&output, output_path.as_ref()) {
        eprintln!("Error writing output: {io_err}");
        process::exit(1);
    }
    process::exit(exit_code);
}

/// Errors before a client exists are returned as `Err`; later failures are
/// rendered with the client's metadata.
async fn run(args: Args) -> Result<(CliOutput, i32), SentinelError> {
    let config: SentinelConfig = load_config(args.config_file.as_deref(), &args.overrides())?;
    let guard = build_guard(&config)?;
    let client = guard.client();
    let info = client.describe();

    if args.describe {
        return Ok((CliOutput::described(info), 0));
    }

    if args.check_credentials {
        let valid = client.validate_credentials().await;
        log::info!(
            "Credentials for {} are {}",
            info.provider,
            if valid { "valid" } else { "invalid" }
        );
        let code = if valid { 0 } else { INVALID_CREDENTIALS_EXIT_CODE };
        return Ok((CliOutput::credentials(valid, Metadata::for_client(&info)), code));
    }

    let text = load_text(args.text_file, args.text)?;

    match guard.assess(&text).await {
        Ok(assessment) => {
            let metadata = Metadata::from_response(client.provider_name(), &assessment.response);
            Ok((CliOutput::success(assessment.verdict, metadata), 0))
        }
        Err(e) => {
            log::error!("Toxicity assessment failed: {e}");
            let output =
                CliOutput::error(e.code().to_string(), e.to_string(), Metadata::for_client(&info));
            Ok((output, e.exit_code()))
        }
    }
}
