use clap::Parser;
use env_logger::Env;
use log::{error, info};

use people_batch::{
    core::{job::BatchStatus, listener::JobHooks},
    item::logger::LoggerWriter,
    people::{connect, import_people, init_schema, run_import},
};

mod args;
use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.job_config()?;

    info!(
        "Importing {} with chunk size {}",
        config.input_path.display(),
        config.chunk_size
    );

    let result = if args.dry_run {
        run_import(&config, &LoggerWriter::default(), &JobHooks::new())
    } else {
        let pool = connect(&config.database_url).await?;
        if config.init_schema {
            init_schema(&pool, &config.table, &config.columns).await?;
        }
        let result = import_people(&config, &pool, JobHooks::new());
        pool.close().await;
        result
    };

    match result {
        Ok(execution) => {
            info!("Exit Status : {}", execution.get_status());
            Ok(())
        }
        Err(err) => {
            error!("Exit Status : {}", BatchStatus::Failed);
            Err(err.into())
        }
    }
}
