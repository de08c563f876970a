//! `katana-gen` entry point (`spec.md` §6.4).

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    katana::generator::cli::run_cli()
}
