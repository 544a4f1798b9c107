mod alsa;
mod annotate;
mod app;
mod cli;
mod config;
mod gateway;
mod graph;
mod pairing;
mod pw;
mod rows;
mod tui;

use clap::Parser;

use cli::{Cli, Command};
use gateway::SystemGateway;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    let gateway = SystemGateway::new(config.commands.clone());
    let mut app = app::App::new(Box::new(gateway));

    match cli.command {
        Some(Command::List { media }) => {
            app.set_media_type(media.media_type());
            app.expand_all();
            for row in &app.rows {
                println!(
                    "{:>6} {}{}{}",
                    row.id_col,
                    " ".repeat(row.indent()),
                    row.label,
                    if row.marked { " (*)" } else { "" }
                );
            }
            Ok(())
        }
        None => tui::run(&mut app, &config.theme),
    }
}
