//! ifstat — log a network interface's throughput to CSV.
//!
//! Every INTERVAL seconds the cumulative byte counters of INTERFACE are read,
//! turned into input/output bytes per second and appended to OUTFILE:
//!
//! ```text
//! date,input in bytes per second,output in bytes per second
//! 2024.03.07 09:05:01,0,0
//! 2024.03.07 09:05:06,1532,871
//! ```
//!
//! SIGINT or SIGTERM stops the loop; the file is flushed and closed and the
//! process exits 0. Any error exits 1.

mod app;
mod cli;
mod error;
mod record;
mod system;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use app::App;
use cli::Cli;
use error::IfstatError;
use record::RecordSink;
use system::collector::Collector;
use system::interface;

/// Set by the signal handler, polled by the sampling loop
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

fn install_signal_handlers() {
    unsafe {
        libc::signal(
            libc::SIGTERM,
            signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGINT,
            signal_handler as *const () as libc::sighandler_t,
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match cli::parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(IfstatError::Usage(usage)) => {
            eprint!("{usage}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let handle = interface::resolve(&cli.interface)?;
    log::info!("monitoring interface '{}' ({handle})", cli.interface);

    install_signal_handlers();

    let sink = RecordSink::create(&cli.outfile)?;
    log::info!(
        "writing to {} every {}s",
        cli.outfile.display(),
        cli.interval
    );

    let app = App::new(handle, cli.interval(), Collector::new(), sink)?;
    let sink = app.run(&SHUTDOWN_REQUESTED)?;
    let rows = sink.finish()?;

    log::info!("wrote {rows} sample(s) to {}", cli.outfile.display());
    Ok(())
}
