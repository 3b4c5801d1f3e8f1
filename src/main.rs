use std::process::ExitCode;

use mysql_mcp_gateway::{cli, infra};

#[tokio::main]
async fn main() {
    infra::logging::init();
    let code = cli::run().await;
    // stdin is read on a blocking thread that a normal runtime shutdown
    // would wait on forever.
    std::process::exit(if code == ExitCode::SUCCESS { 0 } else { 1 });
}
