use clap::Parser;

use zincc_drv::{init_logging, run, Cli, Config};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::from_cli(cli);
    std::process::exit(run(&config));
}
