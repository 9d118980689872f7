use anyhow::{Context, Result};
use clap::Subcommand;
use shared::{config::ClientConfig, models::Area};

use super::{Output, signed_in};

#[derive(Subcommand, Debug)]
pub enum AreasCommand {
    /// List organizational areas
    List,
}

pub async fn run(command: AreasCommand, config: &ClientConfig, output: Output) -> Result<()> {
    let store = signed_in(config).await?;
    match command {
        AreasCommand::List => {
            let areas = store
                .api()
                .list_areas()
                .await
                .context("failed to list areas")?;
            output.emit(&areas, |areas| print_areas(areas))
        }
    }
}

fn print_areas(areas: &[Area]) {
    if areas.is_empty() {
        println!("No areas found.");
    }
    for area in areas {
        match &area.description {
            Some(description) => println!("{:<16} {} - {}", area.id, area.name, description),
            None => println!("{:<16} {}", area.id, area.name),
        }
    }
}
