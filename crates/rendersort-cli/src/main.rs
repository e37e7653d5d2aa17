//! Thin entrypoint for the rendersort command-line tool.

#[tokio::main]
async fn main() {
    let code = rendersort_cli::run().await;
    std::process::exit(code);
}
