use anyhow::{bail, Context, Result};
use clap::Parser;
use tapo_cloud::{CloudClient, Config, Device};
use tracing_subscriber::EnvFilter;

/// List the devices registered to a Tapo cloud account.
#[derive(Parser, Debug)]
#[command(name = "tapo-cloud", version, about)]
struct Cli {
    /// Config file (default: ~/.tapo-cloud/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Print the raw device records as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "tapo_cloud=info",
        1 => "tapo_cloud=debug",
        _ => "tapo_cloud=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_devices(devices: &[Device]) {
    println!("Tapo devices:");
    for device in devices {
        println!();
        println!("Name:   {}", device.device_name);
        println!("Type:   {}", device.device_type);
        println!("ID:     {}", device.device_id);
        println!("Model:  {}", device.model);
        println!("Status: {}", device.connection());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides();
    if !config.account.is_complete() {
        bail!(
            "No credentials: set [account] email/password in {} or {}/{}",
            config.config_path.display(),
            tapo_cloud::config::EMAIL_ENV,
            tapo_cloud::config::PASSWORD_ENV
        );
    }

    let mut client = CloudClient::new(config.cloud.clone()).context("Failed to build HTTP client")?;
    client
        .login(&config.account.email, &config.account.password)
        .context("Login failed")?;
    eprintln!("Logged in.");

    let devices = client.list_devices().context("Failed to list devices")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        print_devices(&devices);
    }
    Ok(())
}
