use std::io;

use clap::Command;

use textfile_exporters::commands::chrony_sources;
use textfile_exporters::core::config::VERSION;
use textfile_exporters::SystemRunner;

fn main() {
    Command::new("chrony_sources")
        .version(VERSION)
        .about("Report chrony time source health for the node_exporter textfile collector")
        .get_matches();

    textfile_exporters::init_logging();

    // Failures surface in the metrics; the exit status is always 0
    if let Err(e) = chrony_sources::execute(&SystemRunner::new(), io::stdout().lock()) {
        log::error!("{:#}", e);
    }
}
