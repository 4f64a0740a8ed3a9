//! Invoque une opération d'un service décrit par WSDL
//!
//! ```text
//! cargo run -p pmowsdl --example call_operation -- Execute ExecuteRequest payload='<SSC/>'
//! ```
//!
//! Le WSDL et l'endpoint viennent de la configuration (`client.wsdl`,
//! `client.endpoint`), surchargeables par `PMOSOAP_CONFIG__CLIENT__WSDL` et
//! `PMOSOAP_CONFIG__CLIENT__ENDPOINT`. À défaut d'endpoint configuré, on
//! prend l'adresse déclarée dans le WSDL.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use pmosoap::{ClientSettings, Params};
use pmowsdl::Definitions;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = pmoconfig::get_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level().unwrap_or_default()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let Some(operation) = args.next() else {
        bail!("usage: call_operation <operation> [title] [name=value ...]");
    };
    let title = args.next().unwrap_or_default();
    let params: Params = args
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("parameter '{arg}' is not name=value"))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .collect();

    let wsdl = config
        .get_wsdl()
        .context("client.wsdl is not configured")?;

    let settings = match ClientSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(_) => {
            let timeout = Duration::from_secs(config.get_timeout_secs()? as u64);
            let definitions = Definitions::load(&wsdl, timeout)?;
            let endpoint = definitions
                .endpoint()
                .context("no endpoint configured and none declared by the WSDL")?;
            println!("Using endpoint declared by the WSDL: {endpoint}");
            ClientSettings::new(endpoint)
        }
    };

    let client = pmowsdl::soap_client(&wsdl, &settings)?;
    println!(
        "Invoking {operation} on {} (SOAPAction: {})",
        client.endpoint(),
        client.soap_action(&operation)
    );

    let response = client.invoke(&operation, &title, &params)?;
    println!("HTTP {}", response.status());

    match response.text() {
        Ok(text) if !text.is_empty() => println!("{text}"),
        _ => println!("{}", response.body_str()?),
    }

    Ok(())
}
