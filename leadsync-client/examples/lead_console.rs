use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use leadsync_client::{Client, ClientEvent, HttpRemote};
use leadsync_core::models::{Connectivity, Lead, LeadFields, KNOWN_STATUSES};
use leadsync_core::reminders::{format_distance, upcoming};

#[derive(Parser)]
#[command(name = "lead-console")]
#[command(about = "Interactive lead management console", long_about = None)]
struct Cli {
    /// Database file name (will auto-create in databases/ directory)
    #[arg(short, long, default_value = "leads")]
    database: String,

    /// Lead API base URL
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    /// Start in offline mode
    #[arg(long)]
    offline: bool,

    /// Rep name stamped onto new notes
    #[arg(short, long, default_value = "Rep")]
    rep: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (only show warnings and errors)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let cli = Cli::parse();

    std::fs::create_dir_all("databases")?;
    let db_file = format!("databases/{}.sqlite3", cli.database);
    let db_url = format!("sqlite:{}?mode=rwc", db_file);

    println!("{}", "Lead Management Console".bold().cyan());
    println!("{}", "=======================".cyan());
    println!("Database: {}", db_file.green());
    println!("Server:   {}", cli.server.blue());

    let connectivity = if cli.offline {
        Connectivity::Offline
    } else {
        Connectivity::Online
    };
    let remote = Arc::new(HttpRemote::new(cli.server.clone()));
    let client = Client::new(&db_url, remote, connectivity).await?;

    client.events().register(|event| match event {
        ClientEvent::SyncStarted => {
            println!("{}", "Syncing offline changes...".cyan());
        }
        ClientEvent::SyncCompleted { applied } => {
            println!("{} {applied} offline actions applied", "Synced:".green());
        }
        ClientEvent::SyncFailed { message } => {
            println!("{} {message}", "Sync failed:".red().bold());
        }
        ClientEvent::RefreshFailed { message } => {
            println!(
                "{} {message} (showing cached data)",
                "Refresh failed:".yellow().bold()
            );
        }
        ClientEvent::RemoteSaveFailed { lead_id, message } => {
            println!("{} lead {lead_id}: {message}", "Save failed for".red());
        }
        _ => {}
    })?;

    let leads = client.start().await;
    println!("Loaded {} leads\n", leads.len().to_string().bold());

    loop {
        let connectivity_label = if client.is_online() {
            "online".green().to_string()
        } else {
            "OFFLINE".yellow().bold().to_string()
        };
        let pending = client.pending_actions().await;

        let choices = vec![
            "List leads".to_string(),
            "View lead".to_string(),
            "Change status".to_string(),
            "Add note".to_string(),
            "Set reminder".to_string(),
            "Clear reminder".to_string(),
            format!("Toggle connectivity (now {connectivity_label})"),
            format!("Sync now ({pending} queued)"),
            "Exit".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;

        match selection {
            0 => list_leads(&client.leads().await),
            1 => {
                if let Some(lead) = pick_lead(&client).await? {
                    print_lead(&lead);
                }
            }
            2 => {
                if let Some(lead) = pick_lead(&client).await? {
                    let status = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt("New status")
                        .items(&KNOWN_STATUSES)
                        .default(0)
                        .interact()?;
                    let fields = LeadFields {
                        status: Some(KNOWN_STATUSES[status].to_string()),
                        ..LeadFields::default()
                    };
                    if let Err(e) = client.update_lead(&lead.id, fields).await {
                        println!("{} {e}", "Update not confirmed remotely:".yellow());
                    }
                }
            }
            3 => {
                if let Some(lead) = pick_lead(&client).await? {
                    let text: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Note")
                        .interact_text()?;
                    if let Err(e) = client.add_note(&lead.id, &text, &cli.rep).await {
                        println!("{} {e}", "Note not confirmed remotely:".yellow());
                    }
                }
            }
            4 => {
                if let Some(lead) = pick_lead(&client).await? {
                    let due_at: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Due (YYYY-MM-DDTHH:MM)")
                        .interact_text()?;
                    let note: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Reminder note (optional)")
                        .allow_empty(true)
                        .interact_text()?;
                    match client.set_reminder_input(&lead.id, &due_at, &note).await {
                        Ok(()) => println!("{}", "Reminder saved".green()),
                        Err(e) => println!("{} {e}", "Could not save reminder:".red()),
                    }
                }
            }
            5 => {
                if let Some(lead) = pick_lead(&client).await? {
                    client.clear_reminder(&lead.id).await;
                    println!("{}", "Reminder cleared".green());
                }
            }
            6 => {
                let next = if client.is_online() {
                    Connectivity::Offline
                } else {
                    Connectivity::Online
                };
                client.set_connectivity(next);
            }
            7 => {
                if let Err(e) = client.sync().await {
                    println!("{} {e}", "Sync failed:".red());
                }
            }
            _ => break,
        }

        println!();
    }

    Ok(())
}

fn list_leads(leads: &[Lead]) {
    if leads.is_empty() {
        println!("{}", "No leads to display".dimmed());
        return;
    }

    let now = Utc::now();
    for lead in upcoming(leads) {
        if let Some(due_at) = lead.reminder_due_at {
            let distance = format_distance(due_at, now);
            let overdue = due_at < now;
            let label = if overdue {
                distance.red().to_string()
            } else {
                distance.yellow().to_string()
            };
            println!("{} {} - {}", "reminder".magenta(), lead.name.bold(), label);
        }
    }

    for lead in leads {
        println!(
            "{} | {} | {} | {}",
            lead.id.dimmed(),
            lead.name.bold(),
            lead.status,
            lead.contact_number,
        );
    }
}

fn print_lead(lead: &Lead) {
    println!("{}", lead.name.bold().underline());
    println!("Status:   {}", lead.status);
    println!("Phone:    {}", lead.contact_number);
    println!("Address:  {}", lead.address);
    println!("Rep:      {}", lead.rep_name);
    println!("Called:   {}", if lead.called { "yes" } else { "no" });
    if !lead.call_result.is_empty() {
        println!("Last call: {} ({})", lead.call_timestamp, lead.call_result);
    }
    if let Some(due_at) = lead.reminder_due_at {
        let note = lead.reminder_note.as_deref().unwrap_or("");
        println!("Reminder: {} {}", due_at.format("%d/%m/%Y %H:%M"), note.dimmed());
    }
    if lead.notes.is_empty() {
        println!("{}", "No notes yet".dimmed());
    } else {
        println!("\n{}\n{}", "Communication log:".bold(), lead.notes);
    }
}

async fn pick_lead(client: &Client) -> Result<Option<Lead>, Box<dyn std::error::Error>> {
    let leads = client.leads().await;
    if leads.is_empty() {
        println!("{}", "No leads to display".dimmed());
        return Ok(None);
    }

    let labels: Vec<String> = leads
        .iter()
        .map(|lead| format!("{} ({})", lead.name, lead.status))
        .collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which lead?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(client.select_lead(&leads[index].id).await)
}
