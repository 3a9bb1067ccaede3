use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordsmith::app::{BridgeClient, BridgeHost, ConnectionTester, RequestRouter, serve_lines};
use wordsmith::domain::{ProviderKind, RewriteKind, RewriteRequest};
use wordsmith::infra::config::ProviderEndpoints;
use wordsmith::infra::llm::{ExecutionContext, ProviderClient};
use wordsmith::infra::settings_store::{JsonFileSettingsStore, SettingsStore};
use wordsmith::infra::wire::WireCodec;
use wordsmith::ui::{FormMessage, MessageKind, OptionsForm, StatusSnapshot, StatusView};

#[derive(Parser, Debug)]
#[command(author, version, about = "LLM rewrite assistant", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether the assistant is ready and enabled
    Status,
    /// Enable or disable the assistant
    Toggle,
    /// Save provider, API key and model
    Configure {
        #[arg(long, value_enum)]
        provider: ProviderArg,
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// List the models offered for a provider
    Models {
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,
    },
    /// Send a short test prompt with the saved settings
    TestConnection,
    /// Rewrite TEXT (or stdin) through the background bridge
    Rewrite {
        #[arg(long, value_enum, default_value_t = KindArg::Improve)]
        kind: KindArg,
        text: Option<String>,
    },
    /// Serve callLLM messages as newline-delimited JSON on stdin/stdout.
    /// Messages are answered one at a time, in the order they arrive.
    Bridge,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProviderArg {
    Openai,
    Anthropic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Anthropic => ProviderKind::Anthropic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Improve,
    Professional,
}

impl From<KindArg> for RewriteKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Improve => RewriteKind::Improve,
            KindArg::Professional => RewriteKind::Professional,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store: Arc<dyn SettingsStore> = match &args.settings {
        Some(path) => Arc::new(JsonFileSettingsStore::new(path)),
        None => Arc::new(JsonFileSettingsStore::open_default()?),
    };
    let endpoints = ProviderEndpoints::from_env()?;

    match args.command {
        Command::Status => {
            print_status(&StatusView::new(store).snapshot()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Toggle => {
            print_status(&StatusView::new(store).toggle()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Configure {
            provider,
            api_key,
            model,
        } => {
            let form = options_form(store, &endpoints)?;
            let mut draft = form.load()?;
            draft.select_provider(provider.into());
            draft.api_key = api_key;
            if let Some(model) = model {
                draft.model = model;
            }
            Ok(report(&form.save(&draft)))
        }
        Command::Models { provider } => {
            let kinds = match provider {
                Some(provider) => vec![provider.into()],
                None => ProviderKind::ALL.to_vec(),
            };
            for kind in kinds {
                println!("{kind}:");
                for option in kind.model_catalog() {
                    println!("  {:<28} {}", option.id, option.label);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::TestConnection => {
            let form = options_form(store, &endpoints)?;
            let draft = form.load()?;
            println!("{}", FormMessage::testing().text);
            Ok(report(&form.test_connection(&draft)))
        }
        Command::Rewrite { kind, text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read text from stdin")?;
                    buffer
                }
            };
            let request = RewriteRequest::new(text, kind.into())?;

            let host = BridgeHost::spawn(background_router(store, &endpoints)?)?;
            let result = host.client().call(request)?;
            match result.into_result() {
                Ok(value) => {
                    println!("{value}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(error) => {
                    eprintln!("{error}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Bridge => {
            let host = BridgeHost::spawn(background_router(store, &endpoints)?)?;
            serve_bridge(&host.client())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "wordsmith=debug" } else { "wordsmith=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn background_router(
    store: Arc<dyn SettingsStore>,
    endpoints: &ProviderEndpoints,
) -> Result<RequestRouter> {
    let client = ProviderClient::with_vendor_providers(endpoints, ExecutionContext::Background)?;
    Ok(RequestRouter::new(store, client))
}

fn options_form(store: Arc<dyn SettingsStore>, endpoints: &ProviderEndpoints) -> Result<OptionsForm> {
    let client = ProviderClient::with_vendor_providers(endpoints, ExecutionContext::Page)?;
    Ok(OptionsForm::new(store, ConnectionTester::new(client)))
}

fn serve_bridge(client: &BridgeClient) -> Result<()> {
    let codec = WireCodec::new()?;
    info!("bridge ready on stdin/stdout");
    serve_lines(client, &codec, io::stdin().lock(), io::stdout().lock())
        .context("bridge stream failed")?;
    Ok(())
}

fn print_status(snapshot: &StatusSnapshot) {
    println!("Status:   {}", snapshot.status.label());
    println!("Provider: {}", snapshot.provider);
    println!("Model:    {}", snapshot.model);
    println!(
        "Enabled:  {} ({})",
        if snapshot.enabled { "yes" } else { "no" },
        snapshot.toggle_label()
    );
}

fn report(message: &FormMessage) -> ExitCode {
    match message.kind {
        MessageKind::Error => {
            eprintln!("{}", message.text);
            ExitCode::FAILURE
        }
        MessageKind::Success | MessageKind::Info => {
            println!("{}", message.text);
            ExitCode::SUCCESS
        }
    }
}
