use clap::Parser;
use color_eyre::Result;
use jaap_ledger::{
    Config, Database, Profile,
    cli::{self, Cli, Commands},
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration with the determined profile
    let mut config = Config::load_with_profile(profile)?;

    // Initialize database
    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Show) {
        Commands::Log { count, date, notes } => {
            cli::handle_log(count, date, notes, &db)?;
        }
        Commands::Show => {
            cli::handle_show(&db)?;
        }
        Commands::Ledger => {
            cli::handle_ledger(&db)?;
        }
        Commands::Milestones => {
            cli::handle_milestones(&db)?;
        }
        Commands::Sankalpa {
            establish,
            context,
            force,
        } => {
            cli::handle_sankalpa(establish, context, force, &db)?;
        }
        Commands::Antaryatra { year, record, skip } => {
            cli::handle_antaryatra(year, record, skip, &db)?;
        }
        Commands::Import { file, format } => {
            cli::handle_import(file, format, &db)?;
        }
        Commands::Export { file, format } => {
            cli::handle_export(file, format, &db)?;
        }
        Commands::Delete { date } => {
            cli::handle_delete(date, &db)?;
        }
        Commands::Palette { name } => match name {
            Some(name) => {
                config.set_palette(&name)?;
                config.save_with_profile(profile)?;
                println!("Palette set to {}", name);
            }
            None => {
                for palette in Config::available_palettes() {
                    if palette == config.palette {
                        println!("* {}", palette);
                    } else {
                        println!("  {}", palette);
                    }
                }
            }
        },
    }

    Ok(())
}
