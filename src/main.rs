use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = ip_tool::cli::Args::parse();
    if let Err(err) = ip_tool::run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
