use anyhow::Result;
use clap::Args;
use lot_sizer_core::ConfigLoader;

/// Arguments for the config command.
#[derive(Args, Debug, Clone)]
pub struct ShowConfigArgs {
    /// Config profile layered over config/Config.toml (reads config/Config.{profile}.toml)
    #[arg(short, long)]
    pub profile: Option<String>,
}

/// Prints the effective configuration as JSON.
///
/// # Errors
///
/// Returns an error if a config source cannot be parsed.
pub fn run_show_config(args: ShowConfigArgs) -> Result<()> {
    let config = match args.profile.as_deref() {
        Some(profile) => ConfigLoader::load_with_profile(profile)?,
        None => ConfigLoader::load()?,
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
