#![allow(missing_docs)]
use anyhow::{Context, Result};
use qrest_core::Content;
use tracing::{info, warn};

use jsonplaceholder::{DEFAULT_BASE_URL, api, parse_call_args, usage};

const USAGE: &str = "usage: jsonplaceholder [--base-url URL] [RESOURCE [NAME=VALUE | NAME=@FILE]...]";

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let AppArgs {
        help,
        base_url,
        resource,
        args,
    } = AppArgs::parse().context("parsing arguments")?;
    let api = api(&base_url).with_context(|| format!("creating API for {base_url}"))?;

    let Some(resource) = resource.filter(|_| !help) else {
        info!("listing available resources");
        #[allow(clippy::print_stdout)]
        {
            println!("{USAGE}\n");
            print!("{}", usage(&api));
        }
        return Ok(());
    };

    let call_args = parse_call_args(&args).context("parsing call arguments")?;
    info!(%resource, ?call_args, "calling");
    let content = api
        .call(&resource, &call_args)
        .with_context(|| format!("calling {resource}"))?;

    let output = match content {
        Content::Json(value) => serde_json::to_string_pretty(&value)?,
        Content::Raw(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    };
    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    info!("Bye!");
    Ok(())
}

#[derive(Debug)]
struct AppArgs {
    help: bool,
    base_url: String,
    resource: Option<String>,
    args: Vec<String>,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let help = pargs.contains(["-h", "--help"]);

        let base_url = pargs
            .opt_value_from_str("--base-url")
            .context("parsing base-url argument")?;

        let resource = pargs
            .opt_free_from_str()
            .context("parsing resource argument")?;

        let remaining = pargs.finish();
        let mut args = Vec::with_capacity(remaining.len());
        for arg in remaining {
            match arg.into_string() {
                Ok(arg) => args.push(arg),
                Err(arg) => warn!(?arg, "Warning: skipping non UTF-8 argument"),
            }
        }

        Ok(Self {
            help,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            resource,
            args,
        })
    }
}
