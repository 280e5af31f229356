use clap::{Parser, Subcommand};
use crossborder::application::{QuotesApi, RemittanceApi};
use crossborder::config::ClientConfig;
use crossborder::domain::ports::{Headers, RequestParams, SharedTransport};
use crossborder::domain::quote::QuotesRequest;
use crossborder::domain::remittance::RemittanceRequest;
use crossborder::infrastructure::http::HttpTransport;
use crossborder::infrastructure::sandbox::SandboxTransport;
use crossborder::interfaces::xml::codec::{PAYMENT_RESPONSE_ROOT, QUOTE_RESPONSE_ROOT};
use crossborder::interfaces::xml::{from_xml, to_xml};
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. CROSSBORDER_* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer from the in-process sandbox instead of the configured endpoint.
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Request exchange-rate proposals for a quote request XML file
    Quote { request: PathBuf },
    /// Submit a payment request XML file
    Pay {
        request: PathBuf,

        /// Encrypt the request and response payloads
        #[arg(long)]
        encrypt: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;

    let transport: SharedTransport = if cli.sandbox {
        let mut sandbox = SandboxTransport::new(config.partner_id.clone());
        if let Some(cipher) = config.payload_cipher()? {
            sandbox = sandbox.with_cipher(Arc::new(cipher));
        }
        Arc::new(sandbox)
    } else {
        Arc::new(HttpTransport::from_config(&config)?)
    };

    let headers = Headers::xml();
    let params = RequestParams::for_partner(config.partner_id.clone());

    let output = match cli.command {
        Command::Quote { request } => {
            let body = std::fs::read(&request).into_diagnostic()?;
            let request: QuotesRequest = from_xml(&body).into_diagnostic()?;
            let quotes = QuotesApi::new(transport)
                .get_quote(&headers, &params, &request)
                .await?;
            to_xml(QUOTE_RESPONSE_ROOT, &quotes).into_diagnostic()?
        }
        Command::Pay { request, encrypt } => {
            let body = std::fs::read(&request).into_diagnostic()?;
            let request: RemittanceRequest = from_xml(&body).into_diagnostic()?;
            let api = RemittanceApi::from_config(transport, &config)?;
            let receipt = if encrypt {
                api.make_payment_with_encryption(&headers, &params, &request)
                    .await?
            } else {
                api.make_payment(&headers, &params, &request).await?
            };
            to_xml(PAYMENT_RESPONSE_ROOT, &receipt).into_diagnostic()?
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output).into_diagnostic()?;
    writeln!(stdout).into_diagnostic()?;

    Ok(())
}
