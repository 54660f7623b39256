mod cli;
mod infra;
mod routes;
mod scoring;
mod server;

use loan_approval::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
