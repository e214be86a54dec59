#[tokio::main]
async fn main() {
    if let Err(err) = cwaf_mcp::mcp::server::run_stdio().await {
        eprintln!("cwaf-mcp: {}", err);
        std::process::exit(1);
    }
}
