mod catalog;
mod config;
mod install;
mod menu;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use crate::catalog::{CatalogStore, table};
use crate::install::{Distro, ShellRunner};
use crate::menu::MenuFlow;
use crate::menu::input::CancelToken;

/// pakka main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to the catalog database (defaults to the user data dir)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the interactive catalog menu (the default)
    Menu,

    /// Print the package table and exit
    List,

    /// Install every cataloged package for the given distribution
    Install {
        #[arg(value_enum)]
        distro: Distro,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        eprintln!("Debug mode is on");
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let db_path = match &cli.database {
        Some(path) => path.clone(),
        None => config::db_path()?,
    };
    if cli.debug {
        eprintln!("Using catalog database at {}", db_path.display());
    }
    let store = CatalogStore::open(&db_path)?;

    match cli.command.as_ref().unwrap_or(&Commands::Menu) {
        Commands::Menu => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut flow = MenuFlow::new(stdin.lock(), stdout.lock(), CancelToken::new());
            flow.run(&store, &mut ShellRunner)?;
        }
        Commands::List => {
            println!("{}", table::render(&store.list_all()?));
        }
        Commands::Install { distro } => {
            let stdout = io::stdout();
            install::install_all(&store, *distro, &mut ShellRunner, &mut stdout.lock())?;
        }
    }

    Ok(())
}
