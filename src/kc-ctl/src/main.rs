mod cli;

use clap::Parser;

use self::cli::CtlOpt;

/// Performs following
///     list storage classes of an endpoint
///     select storage classes and access modes exposed by the console
#[tokio::main]
async fn main() {
    fluvio_future::subscriber::init_logger();

    if let Err(err) = CtlOpt::parse().process().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
