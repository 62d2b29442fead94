//! Mistbox - a disposable mailbox in the terminal
//!
//! Provisions a throwaway address against the mail provider, then lists,
//! reads and watches the inbox until the countdown runs out. The mailbox
//! session persists in ~/.config/mistbox/ so successive commands operate
//! on the same address.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use tempmail::{
    Countdown, FileSessionStore, MailTmClient, MailboxService, MessageId, MessageSummary,
    Settings,
};

#[derive(Parser)]
#[command(name = "mistbox", about = "Disposable mailboxes in the terminal", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current mailbox address, provisioning one if needed
    Address,
    /// Discard the current mailbox and provision a fresh one
    New,
    /// List the messages currently in the inbox
    Inbox,
    /// Read one message (flags it as seen)
    Read {
        /// Message ID from the inbox listing
        id: String,
    },
    /// Poll the inbox until the countdown expires (Ctrl-C to quit)
    Watch {
        /// Keep extending the countdown instead of stopping at zero
        #[arg(long)]
        keep_alive: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Bootstrap config directory
    config::init().context("Failed to initialize config directory")?;

    let settings = Settings::load()?;
    let provider = Arc::new(MailTmClient::new(settings.api_base.clone()));
    let store = Arc::new(FileSessionStore::in_config_dir()?);
    let mut service = MailboxService::new(provider, store, settings);

    match cli.command {
        Command::Address => {
            ensure_mailbox(&mut service)?;
            println!("{}", service.address().unwrap_or_default());
        }
        Command::New => {
            service.regenerate()?;
            println!("{}", service.address().unwrap_or_default());
        }
        Command::Inbox => {
            ensure_mailbox(&mut service)?;
            service.refresh()?;
            print_inbox(service.messages());
        }
        Command::Read { id } => {
            ensure_mailbox(&mut service)?;
            let detail = service.open_message(&MessageId::new(id))?;
            print_message(&detail);
        }
        Command::Watch { keep_alive } => {
            ensure_mailbox(&mut service)?;
            watch(&mut service, keep_alive)?;
        }
    }

    Ok(())
}

/// Start the service, provisioning a fresh mailbox when the stored session
/// is absent or was invalidated by the provider.
fn ensure_mailbox(service: &mut MailboxService) -> Result<()> {
    service.start()?;
    if !service.has_session() {
        service.regenerate()?;
    }
    Ok(())
}

fn print_inbox(messages: &[MessageSummary]) {
    if messages.is_empty() {
        println!("No messages yet.");
        return;
    }
    for message in messages {
        let marker = if message.seen { ' ' } else { '*' };
        println!(
            "{} {}  {}  {}  {}",
            marker,
            message.id.as_str(),
            message.created_at.format("%H:%M"),
            message.from.display(),
            message.subject,
        );
    }
}

fn print_message(detail: &tempmail::MessageDetail) {
    println!("Subject: {}", detail.subject);
    println!("From:    {}", detail.from.display());
    if !detail.to.is_empty() {
        let to: Vec<String> = detail.to.iter().map(|s| s.display()).collect();
        println!("To:      {}", to.join(", "));
    }
    println!("Date:    {}", detail.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    match detail.display_body() {
        Some(body) => println!("{}", body),
        None => println!("(no content)"),
    }
}

/// Tick once a second, printing arrivals, until the countdown expires or
/// the user interrupts.
fn watch(service: &mut MailboxService, keep_alive: bool) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    println!(
        "Watching {} (expires in {})",
        service.address().unwrap_or_default(),
        service.countdown_display(),
    );

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_secs(1));

        match service.tick() {
            Ok(arrivals) => {
                for message in arrivals {
                    println!(
                        "[{}] {}  {}",
                        message.created_at.format("%H:%M:%S"),
                        message.from.display(),
                        message.subject,
                    );
                }
            }
            Err(e) => warn!("Poll failed: {:#}", e),
        }

        if !service.has_session() {
            println!("Mailbox credentials expired; run `mistbox new` for a fresh address.");
            break;
        }

        if service.is_expired() {
            if keep_alive {
                service.extend(Countdown::EXTENSION_SECS);
            } else {
                println!("Countdown reached zero; mailbox left to expire.");
                break;
            }
        }
    }

    service.stop();
    Ok(())
}
