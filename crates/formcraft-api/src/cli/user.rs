//! User CLI commands: add (with API key issue) and list.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use formcraft_types::user::SyncUserRequest;

use crate::state::AppState;

/// Upsert a user and print a freshly issued API key.
///
/// The plaintext key is only ever shown here; the database stores its hash.
pub async fn add_user(
    state: &AppState,
    external_id: String,
    email: String,
    name: Option<String>,
    key_name: &str,
    json: bool,
) -> Result<()> {
    let user = state
        .user_service
        .sync_user(SyncUserRequest {
            external_id,
            email,
            name,
        })
        .await?;
    let api_key = state.api_keys.issue(&user.id, key_name).await?;

    if json {
        let out = serde_json::json!({
            "user": user,
            "api_key": api_key,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} User ready", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("External ID:").bold(), style(&user.external_id).cyan());
    println!("  {}  {}", style("Email:").bold(), user.email);
    if let Some(ref name) = user.name {
        println!("  {}  {}", style("Name:").bold(), name);
    }
    println!("  {}  {}", style("ID:").bold(), style(user.id.to_string()).dim());
    println!();
    println!(
        "  {} API key (save this -- it won't be shown again):",
        style("🔑").bold()
    );
    println!();
    println!("  {}", style(&api_key).yellow().bold());
    println!();

    Ok(())
}

/// Print all users as a table.
pub async fn list_users(state: &AppState, json: bool) -> Result<()> {
    let users = state.user_service.list_users().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!("  No users yet. Add one with:");
        println!(
            "    {}",
            style("formcraft user add --external-id <id> --email <email>").cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("External ID").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for user in &users {
        table.add_row(vec![
            Cell::new(&user.external_id).fg(Color::Cyan),
            Cell::new(&user.email),
            Cell::new(user.name.as_deref().unwrap_or("-")),
            Cell::new(user.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
