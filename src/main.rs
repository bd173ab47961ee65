use clap::Parser;
use opendata::core::smoke::run_smoke_check;
use opendata::utils::logger;
use opendata::CliArgs;

fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::debug!("CLI args: {:?}", args);

    let result = {
        let mut stdout = std::io::stdout().lock();
        run_smoke_check(&mut stdout, &args.config_map())
    };

    match result {
        Ok(()) => {
            tracing::info!("smoke check passed");
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!("smoke check failed: {}", e);
            println!("❌ Error: {}", e);

            // Debug output of anyhow carries the cause chain and, with
            // RUST_BACKTRACE=1, the backtrace.
            let report = anyhow::Error::from(e);
            eprintln!("{:?}", report);
            std::process::exit(1);
        }
    }
}
