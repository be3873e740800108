mod cli;
mod infra;
mod reports;
mod routes;
mod server;

use radar_ali::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
