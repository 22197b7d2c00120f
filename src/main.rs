//! `strata`: send one request and print the routed response.
//!
//! ```text
//! strata [--config FILE] [-X METHOD] [-H 'Name: value']... [-d BODY] [--json] URI
//! ```
//!
//! Exit codes: 0 when a response arrived, 1 on transport failure,
//! 2 on unusable arguments or configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use strata::config::{load_config, ClientConfig};
use strata::message::RequestUri;
use strata::observability::init_logging;
use strata::{Error, HeaderBearer, HttpMessage, Request, Response, UserAgent};

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about = "Send an HTTP request and print the response", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,

    /// Absolute http(s) URI
    uri: String,
}

/// Response tagged with the rule class that accepted it.
struct Rendered {
    class: &'static str,
    response: Response,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("strata: {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => ClientConfig::default(),
    };

    init_logging(&config.observability);

    let request = match build_request(&cli, &config) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("strata: {}", e);
            return ExitCode::from(2);
        }
    };

    tracing::info!(method = %request.method(), uri = %request.uri(), "Sending");

    let mut outcome = request.send_routed::<Rendered>();
    let routed = outcome
        .success(|response| Rendered { class: "success", response })
        .and_then(|o| o.redirect(|response| Rendered { class: "redirect", response }))
        .and_then(|o| o.error(|response| Rendered { class: "error", response }));
    if let Err(e) = routed {
        eprintln!("strata: {}", e);
        return ExitCode::from(2);
    }

    let rendered = match outcome.await {
        Ok(rendered) => rendered,
        Err(Error::UnmatchedResponse(response)) => Rendered {
            class: "unhandled",
            response: *response,
        },
        Err(e) => {
            tracing::error!(error = %e, "Request failed");
            eprintln!("strata: {}", e);
            return ExitCode::from(1);
        }
    };

    print_response(&rendered, cli.json);
    ExitCode::SUCCESS
}

fn build_request(cli: &Cli, config: &ClientConfig) -> Result<Request, Box<dyn std::error::Error>> {
    if RequestUri::parse(&cli.uri).is_none() {
        return Err(format!("unsupported URI {:?}; expected an absolute http(s) URI", cli.uri).into());
    }

    let agent = UserAgent::from_config(config)?;
    let mut builder = Request::builder()
        .user_agent(&agent)
        .method(cli.method.to_ascii_uppercase())
        .uri(cli.uri.as_str());

    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("malformed header {:?}; expected 'Name: value'", header))?;
        builder = builder.add_header(name.trim(), value.trim());
    }

    if let Some(data) = &cli.data {
        builder = builder.body(data.as_str());
    }

    Ok(builder.build()?)
}

fn print_response(rendered: &Rendered, json: bool) {
    let response = &rendered.response;
    if json {
        let document = serde_json::json!({
            "class": rendered.class,
            "version": response.version(),
            "status": response.status(),
            "reason": response.reason(),
            "headers": response.headers(),
            "body": response.text(),
        });
        println!("{}", document);
    } else {
        println!("{}", response.status_line());
        print!("{}", response.header_block());
        println!();
        if let Some(text) = response.text() {
            println!("{}", text);
        }
    }
}
