mod cli;
mod commands;
mod output;
mod page_range;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pdf::{ContentKinds, KeyLength, ScaleMode};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decrypt {
            path,
            password,
            output,
        } => {
            commands::decrypt::run(&path, &password, output.as_deref())?;
        }
        Commands::Encrypt {
            path,
            user_password,
            owner_password,
            use_40bit,
            output,
        } => {
            let key_length = if use_40bit {
                KeyLength::Bits40
            } else {
                KeyLength::Bits128
            };
            commands::encrypt::run(
                &path,
                &user_password,
                owner_password.as_deref(),
                key_length,
                output.as_deref(),
            )?;
        }
        Commands::Delete {
            path,
            select,
            output,
        } => {
            commands::delete::run(&path, &select.selection(false)?, output.as_deref())?;
        }
        Commands::Extract {
            path,
            select,
            output,
        } => {
            commands::extract::run(&path, &select.selection(false)?, output.as_deref())?;
        }
        Commands::Insert {
            path,
            insert,
            page,
            output,
        } => {
            commands::insert::run(&path, &insert, &page, output.as_deref())?;
        }
        Commands::Merge {
            inputs,
            all,
            output,
        } => {
            commands::merge::run(&inputs, all, output.as_deref())?;
        }
        Commands::Remove {
            path,
            images,
            links,
            text,
            output,
        } => {
            let kinds = ContentKinds {
                images,
                links,
                text,
            };
            commands::remove::run(&path, kinds, output.as_deref())?;
        }
        Commands::Reverse { path, output } => {
            commands::reverse::run(&path, output.as_deref())?;
        }
        Commands::Rotate {
            path,
            select,
            all,
            angle,
            output,
        } => {
            commands::rotate::run(&path, &select.selection(all)?, angle, output.as_deref())?;
        }
        Commands::Scale {
            path,
            select,
            all,
            horizontal,
            vertical,
            scale_to,
            output,
        } => {
            let mode = if scale_to {
                ScaleMode::To {
                    width: horizontal,
                    height: vertical,
                }
            } else {
                ScaleMode::By {
                    horizontal,
                    vertical,
                }
            };
            commands::scale::run(&path, &select.selection(all)?, mode, output.as_deref())?;
        }
        Commands::Split {
            path,
            select,
            all,
            output,
        } => {
            commands::split::run(&path, &select.selection(all)?, output.as_deref())?;
        }
        Commands::Info { path, json } => {
            commands::info::run(&path, json)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for summaries and `info --json`.
/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
