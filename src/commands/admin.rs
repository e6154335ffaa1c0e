use clap::{Args, Subcommand};
use exkursion_core::RecordsStore;

#[derive(Args)]
pub struct AdminCommand {
    #[command(subcommand)]
    pub command: AdminSubcommand,
}

#[derive(Subcommand)]
pub enum AdminSubcommand {
    /// Log in with the shared admin token
    Login {
        /// Admin token
        token: String,
    },

    /// Log out
    Logout,

    /// Show whether an admin is logged in
    Status,
}

impl AdminCommand {
    pub fn run(&self, records: &mut RecordsStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AdminSubcommand::Login { token } => {
                if records.login(token)? {
                    println!("Logged in as admin.");
                    Ok(())
                } else {
                    Err("Invalid admin token".into())
                }
            }

            AdminSubcommand::Logout => {
                records.logout()?;
                println!("Logged out.");
                Ok(())
            }

            AdminSubcommand::Status => {
                records.ensure_hydrated();
                if records.is_authenticated() {
                    println!("Logged in as admin.");
                } else {
                    println!("Not logged in.");
                }
                println!(
                    "{} excursion(s), {} teilnehmer",
                    records.excursions().len(),
                    records.teilnehmer().len()
                );
                Ok(())
            }
        }
    }
}
