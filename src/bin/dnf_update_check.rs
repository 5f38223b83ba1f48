use std::io;

use clap::Command;

use textfile_exporters::commands::dnf_update_check;
use textfile_exporters::core::config::VERSION;
use textfile_exporters::SystemRunner;

fn main() {
    Command::new("dnf_update_check")
        .version(VERSION)
        .about("Report pending dnf/yum updates for the node_exporter textfile collector")
        .get_matches();

    textfile_exporters::init_logging();

    // Failures surface in the metrics; the exit status is always 0
    if let Err(e) = dnf_update_check::execute(&SystemRunner::new(), io::stdout().lock()) {
        log::error!("{:#}", e);
    }
}
