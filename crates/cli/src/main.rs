use clap::{Parser, Subcommand};

mod commands;

use commands::{MultiplierArgs, ShowConfigArgs, SizeArgs};

#[derive(Parser)]
#[command(name = "lot-sizer")]
#[command(about = "Options position size calculator based on the leverage multiplier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a position from risk budget, TP/SL and observed multipliers
    Size(SizeArgs),
    /// Compute the multiplier for one option/underlying change pair
    Multiplier(MultiplierArgs),
    /// Print the effective configuration
    Config(ShowConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so report and JSON output stay clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Size(args) => commands::run_size(args)?,
        Commands::Multiplier(args) => commands::run_multiplier(args)?,
        Commands::Config(args) => commands::run_show_config(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lot_sizer_core::SizingMethod;
    use rust_decimal_macros::dec;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_accepts_negative_observations() {
        let cli = Cli::try_parse_from([
            "lot-sizer",
            "size",
            "--method",
            "Conservative",
            "--observation",
            "-16.39:-0.23",
            "-o",
            "101:1.17",
            "--lot-size",
            "0.15",
        ])
        .unwrap();

        let Commands::Size(args) = cli.command else {
            panic!("expected size command");
        };
        assert_eq!(args.method, Some(SizingMethod::Conservative));
        assert_eq!(
            args.observations,
            vec![(dec!(-16.39), dec!(-0.23)), (dec!(101), dec!(1.17))]
        );
        assert_eq!(args.lot_size, Some(dec!(0.15)));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let result = Cli::try_parse_from(["lot-sizer", "size", "--method", "kelly"]);
        assert!(result.is_err());
    }

    #[test]
    fn multiplier_accepts_negative_positionals() {
        let cli = Cli::try_parse_from(["lot-sizer", "multiplier", "-16.39", "-0.23"]).unwrap();
        let Commands::Multiplier(args) = cli.command else {
            panic!("expected multiplier command");
        };
        assert_eq!(args.option_change, dec!(-16.39));
        assert_eq!(args.underlying_change, dec!(-0.23));
    }
}
