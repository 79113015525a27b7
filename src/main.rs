mod classifier;
mod cleaning;
mod clusters;
mod config;
mod profile;
mod providers;
mod reply;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "auto-email")]
#[command(about = "Classify unread email into keyword clusters and draft replies locally")]
struct Cli {
    /// Path to the unread-mail JSON export (defaults to the config dir)
    #[arg(long, global = true)]
    mailbox: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure settings
    Config {
        /// Set the default Ollama model
        #[arg(long)]
        model: Option<String>,
    },
    /// Classify unread emails and show them per cluster
    Scan {
        /// Maximum number of emails to scan
        #[arg(short = 'n', long, default_value = "10")]
        max: usize,
        /// Show only emails whose cluster has auto-reply enabled
        #[arg(long)]
        auto_reply_only: bool,
    },
    /// Draft a reply to the Nth unread email (1-based, as listed by scan)
    Reply {
        index: usize,
        /// Override the configured model for this draft
        #[arg(long)]
        model: Option<String>,
    },
    /// Manage keyword clusters
    Clusters {
        #[command(subcommand)]
        action: ClustersAction,
    },
    /// Show the reply profile
    Profile,
}

#[derive(Subcommand)]
enum ClustersAction {
    /// List all clusters
    List,
    /// Add a cluster
    Add {
        name: String,
        /// Comma-separated keywords
        #[arg(long, value_delimiter = ',', required = true)]
        keywords: Vec<String>,
        /// Enable auto-reply drafts for this cluster
        #[arg(long)]
        auto_reply: bool,
    },
    /// Delete a cluster by exact name
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::Config::load()?;
    let mailbox = cli.mailbox.unwrap_or_else(config::mailbox_path);

    match cli.command {
        Commands::Config { model } => {
            commands::config(model)?;
        }
        Commands::Scan { max, auto_reply_only } => {
            commands::scan(max, auto_reply_only, mailbox).await?;
        }
        Commands::Reply { index, model } => {
            let model = model.as_deref().unwrap_or_else(|| cfg.default_model());
            commands::reply(index, model, mailbox).await?;
        }
        Commands::Clusters { action } => match action {
            ClustersAction::List => commands::clusters_list()?,
            ClustersAction::Add { name, keywords, auto_reply } => {
                commands::clusters_add(&name, &keywords, auto_reply)?;
            }
            ClustersAction::Delete { name } => commands::clusters_delete(&name)?,
        },
        Commands::Profile => {
            commands::profile()?;
        }
    }

    Ok(())
}

mod commands {
    use crate::classifier::{self, UNCATEGORIZED};
    use crate::cleaning;
    use crate::clusters::{Cluster, ClusterError, ClusterStore};
    use crate::config::{self, Config};
    use crate::profile::Profile;
    use crate::providers::local::LocalMailbox;
    use crate::providers::{Email, MailSource};
    use crate::reply;
    use anyhow::Result;
    use chrono::Local;
    use std::path::PathBuf;

    fn store() -> ClusterStore {
        ClusterStore::new(config::clusters_path())
    }

    pub fn config(model: Option<String>) -> Result<()> {
        let mut cfg = Config::load()?;

        if let Some(m) = model {
            cfg.model = Some(m.clone());
            cfg.save()?;
            println!("Default model set to: {}", m);
        } else {
            println!("Current settings:");
            println!("  model: {}", cfg.default_model());
        }
        Ok(())
    }

    pub async fn scan(max: usize, auto_reply_only: bool, mailbox: PathBuf) -> Result<()> {
        let source = LocalMailbox::new(mailbox);
        let clusters = store().list()?;
        let emails = source.fetch_unread(max).await?;

        if emails.is_empty() {
            println!("No unread messages.");
            return Ok(());
        }

        println!(
            "Found {} unread messages ({})\n",
            emails.len(),
            Local::now().format("%Y-%m-%d %H:%M")
        );

        let mut shown = 0;
        for (i, email) in emails.iter().enumerate() {
            let hit = classifier::classify(&email.subject, &email.body, &clusters);
            let auto_reply = hit.map(|c| c.auto_reply).unwrap_or(false);

            if auto_reply_only && !auto_reply {
                continue;
            }
            shown += 1;

            let name = hit.map(|c| c.name.as_str()).unwrap_or(UNCATEGORIZED);
            let marker = if auto_reply { "⚡" } else { " " };
            println!(
                "{:>3} {} [{}] {} | {} | {}",
                i + 1,
                marker,
                name,
                truncate(&email.subject, 50),
                email.from,
                email.date
            );
            let preview_src = if email.snippet.is_empty() { &email.body } else { &email.snippet };
            println!("      {}", cleaning::preview(preview_src, 120));
        }

        if shown == 0 {
            println!("No emails in auto-reply clusters.");
        }
        Ok(())
    }

    pub async fn reply(index: usize, model: &str, mailbox: PathBuf) -> Result<()> {
        let source = LocalMailbox::new(mailbox);
        let clusters = store().list()?;
        let profile = Profile::load(&config::profile_path())?;

        let emails = source.fetch_unread(usize::MAX).await?;
        let email: &Email = index
            .checked_sub(1)
            .and_then(|i| emails.get(i))
            .ok_or_else(|| {
                anyhow::anyhow!("no unread email #{} (found {})", index, emails.len())
            })?;

        let category = classifier::classify(&email.subject, &email.body, &clusters)
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED);

        println!("Replying to: {}", email.subject);
        println!("  From: {}", email.from);
        println!("  Category: {}", category);
        println!("  Model: {}\n", model);

        match reply::generate_reply(&email.body, &email.from, &profile, model).await {
            Ok(draft) => {
                println!("Suggested reply:\n\n{}", draft);
            }
            Err(e) => {
                // Generation failures never touch the cluster document; just
                // report this attempt and leave everything else alone.
                eprintln!("Error generating reply: {}", e);
                std::process::exit(1);
            }
        }
        Ok(())
    }

    pub fn clusters_list() -> Result<()> {
        let clusters = store().list()?;

        if clusters.is_empty() {
            println!("No clusters defined.");
            return Ok(());
        }

        for cluster in &clusters {
            println!("{}", format_cluster(cluster));
        }
        Ok(())
    }

    pub fn clusters_add(name: &str, keywords: &[String], auto_reply: bool) -> Result<()> {
        match store().add(name, keywords, auto_reply) {
            Ok(()) => {
                println!("Cluster '{}' added.", name.trim());
                Ok(())
            }
            Err(e @ ClusterError::Duplicate(_)) => {
                println!("Warning: {}", e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn clusters_delete(name: &str) -> Result<()> {
        store().delete(name)?;
        println!("Cluster '{}' deleted.", name);
        Ok(())
    }

    pub fn profile() -> Result<()> {
        let profile = Profile::load(&config::profile_path())?;
        println!("Name:   {}", profile.name);
        println!("Role:   {}", profile.role);
        println!("Skills: {}", profile.skills.join(", "));
        println!("Tone:   {}", profile.tone());
        Ok(())
    }

    fn format_cluster(cluster: &Cluster) -> String {
        let flag = if cluster.auto_reply { " [auto-reply]" } else { "" };
        format!("{} — {}{}", cluster.name, cluster.keywords.join(", "), flag)
    }

    fn truncate(s: &str, max: usize) -> String {
        s.chars().take(max).collect()
    }
}
