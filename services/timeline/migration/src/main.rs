use sea_orm_migration::prelude::*;

use lifeline_timeline_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
