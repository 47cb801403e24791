mod cli;
mod clients;
mod infra;
mod routes;
mod score;
mod server;

use creditlens::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
