//! Demo entry point: attach the schema, resolve it and greet.

use std::thread;

use asp::{Asp, serialize_flags};
use clap::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hello_asp::config::HelloConfig;
use hello_asp::error::Result;
use hello_asp::{greeting, print_line};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    run().map_err(color_eyre::eyre::Report::from)
}

fn command() -> Command {
    Command::new("hello_asp")
        .about("Greets someone using layered configuration")
        .subcommand(Command::new("greet").about("Print the greeting (default)"))
        .subcommand(Command::new("flags").about("Print the resolved options as flags"))
}

fn run() -> Result<()> {
    let mut command = command();
    let asp = Asp::<HelloConfig>::builder()
        .env_prefix("HELLO")
        .default_config_name("hello_asp")
        .attach(&mut command, &HelloConfig::defaults())?;
    let matches = command.get_matches();
    let (name, selected) = matches.subcommand().unwrap_or(("greet", &matches));
    let config = asp.config(selected)?;
    info!(flags = %serialize_flags(&config, true)?, "resolved configuration");

    if name == "flags" {
        return print_line(&serialize_flags(&config, false)?);
    }
    let line = greeting(&config)?;
    if !config.delay.is_zero() {
        thread::sleep(config.delay);
    }
    print_line(&line)
}
