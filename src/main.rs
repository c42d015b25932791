use clap::{ArgGroup, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use razorpay_bridge::application::checkout::Razorpay;
use razorpay_bridge::domain::envelope::{CheckoutEvent, Envelope};
use razorpay_bridge::domain::method::Method;
use razorpay_bridge::domain::ports::CheckoutChannelBox;
use razorpay_bridge::infrastructure::host_process::HostProcess;
use razorpay_bridge::infrastructure::in_memory::InMemoryChannel;
use razorpay_bridge::interfaces::json::event_writer::EventWriter;
use razorpay_bridge::interfaces::json::input_reader::{read_fixture, read_options};
use serde_json::Value;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("channel").required(true).args(["host", "responses"])))]
struct Cli {
    /// Native host program, spoken to with JSON lines over stdin/stdout
    #[arg(long, value_name = "PROGRAM")]
    host: Option<String>,

    /// Argument passed to the host program (repeatable)
    #[arg(long = "host-arg", value_name = "ARG", requires = "host")]
    host_args: Vec<String>,

    /// JSON file of canned replies keyed by method name, used instead of a host
    #[arg(long, value_name = "FILE")]
    responses: Option<PathBuf>,

    /// Merchant API key handed to the SDK before the command runs
    #[arg(long, env = "RAZORPAY_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the standard checkout with the options in FILE
    Submit { options: PathBuf },
    /// Open checkout on the CRED rail with the options in FILE
    PayWithCred { options: PathBuf },
    /// Register listeners and print any result the host buffered
    Listen,
    /// Call a lookup method, e.g. `getCardNetwork 4111111111111111`
    Query { method: String, arg: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (channel, host): (CheckoutChannelBox, Option<Arc<HostProcess>>) =
        if let Some(program) = &cli.host {
            let process = Arc::new(HostProcess::spawn(program, &cli.host_args).into_diagnostic()?);
            let channel: CheckoutChannelBox = Box::new(Arc::clone(&process));
            (channel, Some(process))
        } else if let Some(path) = &cli.responses {
            let fixture = read_fixture(File::open(path).into_diagnostic()?).into_diagnostic()?;
            let channel: CheckoutChannelBox =
                Box::new(InMemoryChannel::from_fixture(fixture).into_diagnostic()?);
            (channel, None)
        } else {
            return Err(miette!("either --host or --responses is required"));
        };

    let razorpay = Razorpay::new(channel);
    if let Some(key) = &cli.key {
        razorpay.initialize(key).await;
    }

    let stdout = io::stdout();
    let mut writer = EventWriter::new(stdout.lock());

    match cli.command {
        Commands::Query { method, arg } => {
            let method: Method = method.parse().into_diagnostic()?;
            let value = run_query(&razorpay, method, arg.as_deref()).await?;
            writer.write_value(&value).into_diagnostic()?;
        }
        command => {
            let (tx, mut rx) = mpsc::unbounded_channel::<(CheckoutEvent, Envelope)>();
            razorpay
                .on_all(move |event, envelope| {
                    let _ = tx.send((event, envelope.clone()));
                })
                .await;

            match command {
                Commands::Submit { options } => {
                    let options = read_options(File::open(options).into_diagnostic()?)
                        .into_diagnostic()?;
                    razorpay.submit(options).await;
                }
                Commands::PayWithCred { options } => {
                    let options = read_options(File::open(options).into_diagnostic()?)
                        .into_diagnostic()?;
                    razorpay.pay_with_cred(options).await;
                }
                _ => {}
            }

            razorpay.clear().await;
            while let Some((event, envelope)) = rx.recv().await {
                writer.write_event(event, &envelope).into_diagnostic()?;
            }
        }
    }
    writer.flush().into_diagnostic()?;

    drop(razorpay);
    if let Some(process) = host.and_then(|h| Arc::try_unwrap(h).ok()) {
        process.shutdown().await.into_diagnostic()?;
    }

    Ok(())
}

async fn run_query(razorpay: &Razorpay, method: Method, arg: Option<&str>) -> Result<Value> {
    let required = || arg.ok_or_else(|| miette!("`{method}` needs an argument"));
    let value = match method {
        Method::GetPaymentMethods => {
            Value::Object(razorpay.payment_methods().await.into_diagnostic()?)
        }
        Method::GetAppsWhichSupportUpi => {
            Value::from(razorpay.apps_which_support_upi().await.into_diagnostic()?)
        }
        Method::GetCardNetwork => {
            Value::from(razorpay.card_network(required()?).await.into_diagnostic()?)
        }
        Method::IsCredAppAvailable => {
            Value::from(razorpay.is_cred_app_available().await.into_diagnostic()?)
        }
        Method::GetWalletLogoUrl => {
            Value::from(razorpay.wallet_logo_url(required()?).await.into_diagnostic()?)
        }
        Method::GetBankLogoUrl => {
            Value::from(razorpay.bank_logo_url(required()?).await.into_diagnostic()?)
        }
        Method::GetSubscriptionAmount => razorpay
            .subscription_amount(required()?)
            .await
            .into_diagnostic()?,
        Method::GetCardNetworkLength => {
            Value::from(razorpay.card_network_length(required()?).await.into_diagnostic()?)
        }
        Method::IsValidCardNumber => {
            Value::from(razorpay.is_valid_card_number(required()?).await.into_diagnostic()?)
        }
        Method::IsValidVpa => {
            Value::Object(razorpay.is_valid_vpa(required()?).await.into_diagnostic()?)
        }
        Method::InitializeSdk | Method::Submit | Method::PayWithCred | Method::Resync => {
            return Err(miette!("`{method}` is not a lookup method"));
        }
    };
    Ok(value)
}
