// mysite/src/bin/mysite_admin.rs

//! Administrative commands run against the configured database.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mysite::auth::Permission;
use mysite::config::AppConfig;
use mysite::errors::{AppError, Result as AppResult};
use mysite::services::admin_commands;
use mysite::state::AppState;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a staff superuser with an empty profile.
  CreateSuperuser {
    username: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long)]
    password: String,
  },
  /// Grant a permission codename (e.g. `shopapp.view_order`) to a user.
  GrantPermission { username: String, permission: String },
  /// Grant a permission to a group, creating the group if needed.
  GrantGroupPermission { group: String, permission: String },
  AddToGroup { username: String, group: String },
  /// Get-or-create the demo order for a user, attached to every product.
  CreateOrder {
    #[arg(default_value = "admin")]
    username: String,
  },
  /// Set the discount of every product whose name contains a substring.
  BulkDiscount {
    #[arg(long, default_value = "Smartphone")]
    name_contains: String,
    #[arg(long, default_value_t = 10)]
    discount: i32,
  },
  /// Create the three demo smartphones.
  BulkCreateProducts {
    #[arg(default_value = "admin")]
    username: String,
  },
  ArchiveProducts {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
  UnarchiveProducts {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
  /// Write all products as CSV to a file, or stdout.
  ExportProductsCsv {
    #[arg(long)]
    output: Option<PathBuf>,
  },
  ImportProductsCsv { username: String, file: PathBuf },
  /// Delete a user. Fails while any order references them.
  DeleteUser { username: String },
  AddArticle {
    title: String,
    #[arg(long)]
    body: Option<String>,
    /// Publication date, `YYYY-MM-DD`. Unpublished when omitted.
    #[arg(long)]
    pub_date: Option<NaiveDate>,
  },
  AddAuthor {
    name: String,
    #[arg(long)]
    bio: Option<String>,
  },
  AddCategory { name: String },
  AddTag { name: String },
}

async fn run(state: &AppState, command: Command) -> AppResult<()> {
  match command {
    Command::CreateSuperuser { username, email, password } => {
      let user = admin_commands::create_superuser(state, &username, &email, &password).await?;
      println!("Created superuser {} (pk={})", user.username, user.id);
    }
    Command::GrantPermission { username, permission } => {
      let permission: Permission = permission.parse()?;
      admin_commands::grant_permission(state, &username, permission).await?;
      println!("Granted {} to {}", permission, username);
    }
    Command::GrantGroupPermission { group, permission } => {
      let permission: Permission = permission.parse()?;
      let group_id = admin_commands::grant_group_permission(state, &group, permission).await?;
      println!("Granted {} to group {} (pk={})", permission, group, group_id);
    }
    Command::AddToGroup { username, group } => {
      admin_commands::add_to_group(state, &username, &group).await?;
      println!("Added {} to {}", username, group);
    }
    Command::CreateOrder { username } => {
      let (order, created) = admin_commands::create_order(state, &username).await?;
      println!("{} {}", if created { "Created" } else { "Found" }, order);
    }
    Command::BulkDiscount { name_contains, discount } => {
      let updated = admin_commands::bulk_discount(state, &name_contains, discount).await?;
      println!("Updated {} products", updated);
    }
    Command::BulkCreateProducts { username } => {
      for product in admin_commands::bulk_create_products(state, &username).await? {
        println!("Created {}", product);
      }
    }
    Command::ArchiveProducts { ids } => {
      let updated = admin_commands::set_products_archived(state, &ids, true).await?;
      println!("Archived {} products", updated);
    }
    Command::UnarchiveProducts { ids } => {
      let updated = admin_commands::set_products_archived(state, &ids, false).await?;
      println!("Unarchived {} products", updated);
    }
    Command::ExportProductsCsv { output } => {
      let csv = admin_commands::export_products_csv(state).await?;
      match output {
        Some(path) => tokio::fs::write(&path, csv).await?,
        None => print!("{}", String::from_utf8_lossy(&csv)),
      }
    }
    Command::ImportProductsCsv { username, file } => {
      let data = tokio::fs::read(&file).await?;
      let created = admin_commands::import_products_csv(state, &username, data).await?;
      println!("Imported {} products", created.len());
    }
    Command::DeleteUser { username } => {
      admin_commands::delete_user(state, &username).await?;
      println!("Deleted {}", username);
    }
    Command::AddArticle { title, body, pub_date } => {
      let article = admin_commands::add_article(state, &title, body.as_deref(), pub_date).await?;
      println!("Created article pk={} at {}", article.id, article.absolute_path());
    }
    Command::AddAuthor { name, bio } => {
      let author = admin_commands::add_author(state, &name, bio.as_deref()).await?;
      println!("Created author pk={}", author.id);
    }
    Command::AddCategory { name } => {
      let category = admin_commands::add_category(state, &name).await?;
      println!("Created category pk={}", category.id);
    }
    Command::AddTag { name } => {
      let tag = admin_commands::add_tag(state, &name).await?;
      println!("Created tag pk={}", tag.id);
    }
  }
  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_max_level(Level::WARN)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let outcome: Result<(), AppError> = async {
    let config = AppConfig::from_env()?;
    let state = mysite::build_state(config).await?;
    run(&state, cli.command).await
  }
  .await;

  match outcome {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!(error = %e, "Command failed.");
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}
