//! Form CLI commands: list, generate, export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use formcraft_core::generator::FormGenerator;
use formcraft_core::generator::heuristic::HeuristicGenerator;
use formcraft_core::repository::form::FormFilter;
use formcraft_types::form::{FieldInput, FormId, DEFAULT_TITLE};
use formcraft_types::generation::GeneratedForm;

use crate::state::AppState;

/// Print an owner's forms as a table.
pub async fn list_forms(state: &AppState, owner: &str, json: bool) -> Result<()> {
    let user = state.user_service.get_by_external_id(owner).await?;
    let forms = state
        .form_service
        .list_forms(&user.id, FormFilter::default())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forms)?);
        return Ok(());
    }

    if forms.is_empty() {
        println!();
        println!("  {} has no forms yet.", style(owner).cyan());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Fields").fg(Color::White),
        Cell::new("Responses").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for form in &forms {
        let status = if form.published {
            Cell::new("● published").fg(Color::Green)
        } else {
            Cell::new("○ draft").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&form.title).fg(Color::Cyan),
            Cell::new(form.id.to_string()).fg(Color::DarkGrey),
            Cell::new(form.fields.len()),
            Cell::new(form.response_count),
            status,
            Cell::new(form.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} form(s)",
        style(forms.len()).bold()
    );
    println!();

    Ok(())
}

/// Generate a draft and print it without saving.
pub async fn generate_form(
    state: &AppState,
    prompt: &str,
    heuristic: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    if json || quiet {
        spinner.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    spinner.set_message("Generating form...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = if heuristic {
        HeuristicGenerator::new().generate(prompt).await
    } else {
        state.generator.generate(prompt).await
    };
    spinner.finish_and_clear();
    let draft = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&draft)?);
        return Ok(());
    }

    print_draft(&draft);
    Ok(())
}

fn print_draft(draft: &GeneratedForm) {
    let title = draft.form.title.as_deref().unwrap_or(DEFAULT_TITLE);

    println!();
    println!(
        "  {} {} {}",
        style("✓").green().bold(),
        style(title).cyan().bold(),
        style(format!("({})", draft.strategy)).dim()
    );
    if let Some(ref description) = draft.form.description {
        println!("  {}", style(description).dim());
    }
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Label").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Required").fg(Color::White),
        Cell::new("Options").fg(Color::White),
    ]);
    for (i, field) in draft.form.fields.iter().enumerate() {
        table.add_row(field_row(i + 1, field));
    }
    println!("{table}");

    if let Some(ref metadata) = draft.metadata {
        println!();
        println!(
            "  {}  ~{} min, {}",
            style("Estimate:").bold(),
            metadata.estimated_completion_minutes,
            format!("{:?}", metadata.complexity).to_lowercase()
        );
        for suggestion in &metadata.suggestions {
            println!("    {} {}", style("•").dim(), suggestion.description);
        }
    }
    println!();
}

fn field_row(position: usize, field: &FieldInput) -> Vec<Cell> {
    let required = if field.required {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::DarkGrey)
    };
    vec![
        Cell::new(position),
        Cell::new(&field.label),
        Cell::new(field.field_type.to_string()).fg(Color::Cyan),
        required,
        Cell::new(field.options.as_ref().map(|o| o.join(", ")).unwrap_or_default()),
    ]
}

/// Write a form's responses as CSV.
pub async fn export_responses(
    state: &AppState,
    form_id: &str,
    owner: &str,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let form_id: FormId = form_id
        .parse()
        .with_context(|| format!("invalid form id: '{form_id}'"))?;
    let user = state.user_service.get_by_external_id(owner).await?;
    let export = state.submission_service.export_csv(&user.id, &form_id).await?;

    let path = out.unwrap_or_else(|| PathBuf::from(&export.file_name));
    if path == Path::new("-") {
        println!("{}", export.content);
        return Ok(());
    }

    tokio::fs::write(&path, &export.content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "rows": export.row_count,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Exported {} response(s) to {}",
        style("✓").green().bold(),
        style(export.row_count).bold(),
        style(path.display()).cyan()
    );
    println!();

    Ok(())
}
