// src/main.rs

use watchdeploy::{cli, config, logging, print_dry_run, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("watchdeploy error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    let cfg = config::load_and_validate(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(0);
    }

    logging::init_logging(args.log_level, &cfg.log_file)?;
    let exit = run(cfg, args.once).await?;
    Ok(exit.exit_code())
}
