use std::io;

use clap::Command;

use textfile_exporters::commands::dnf_last_update;
use textfile_exporters::core::config::VERSION;
use textfile_exporters::SystemRunner;

fn main() {
    Command::new("dnf_last_update")
        .version(VERSION)
        .about("Report the most recent package installation time for the node_exporter textfile collector")
        .get_matches();

    textfile_exporters::init_logging();

    // Failures surface in the metrics; the exit status is always 0
    if let Err(e) = dnf_last_update::execute(&SystemRunner::new(), io::stdout().lock()) {
        log::error!("{:#}", e);
    }
}
