use kongdash::app::start_host;
use kongdash::error::KongdashError;
use kongdash::logger::initialize as LoggerInitialize;
use kongdash::menu::{MenuExit, run_menu};
use kongdash::settings::HostSettings;

use std::process::ExitCode;

use log::{error, info};
use tokio::io::{BufReader, stdin};
use tokio::signal::ctrl_c;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), KongdashError> {
    let settings = HostSettings::from_env()?;

    // Initialize logger FIRST
    LoggerInitialize(settings.log_dir())?;

    info!("KongDash host starting");
    info!("Config directory: {}", settings.config_dir().display());
    if let Some(path) = settings.dotenv_path() {
        info!("Loaded .env from {}", path.display());
    }

    let host = start_host(&settings).await?;
    info!("IPC server listening on port {}", host.port());
    info!("Menu: type 'settings' to open the settings view, 'quit' to exit");

    let outcome = tokio::select! {
        result = run_menu(BufReader::new(stdin()), host.handlers()) => result,
        _ = ctrl_c() => {
            info!("Interrupted");
            Ok(MenuExit::Quit)
        }
    };

    let outcome = match outcome {
        Ok(MenuExit::InputClosed) => {
            info!("No menu input, serving until interrupted");
            let _ = ctrl_c().await;
            Ok(())
        }
        Ok(MenuExit::Quit) => Ok(()),
        Err(e) => Err(e),
    };

    host.shutdown();
    outcome
}
