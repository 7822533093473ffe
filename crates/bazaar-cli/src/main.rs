//! `bazaar` binary entrypoint.

#[tokio::main]
async fn main() {
    std::process::exit(bazaar_cli::run().await);
}
