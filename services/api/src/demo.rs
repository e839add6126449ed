use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;
use jobboard::error::AppError;
use jobboard::workflows::posting::{
    DraftPreview, PostingPublisher, PostingWizardService, SimulatedPublisher, SuccessScreen,
    TemplateFilter, TemplateRepository, WizardConfig, WizardStep,
};

use crate::infra::InMemoryTemplateRepository;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Template posting to duplicate
    #[arg(long, default_value = "posting-1001")]
    pub(crate) posting_id: String,
    /// Date used for deadline validation (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Simulated publishing latency in milliseconds
    #[arg(long, default_value_t = 0)]
    pub(crate) submit_delay_ms: u64,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let service = PostingWizardService::new(
        Arc::new(InMemoryTemplateRepository::seeded()),
        Arc::new(SimulatedPublisher::default()),
        WizardConfig {
            submit_delay: Duration::from_millis(args.submit_delay_ms),
            ..WizardConfig::default()
        },
    );

    for line in walk_duplicate_flow(&service, &args.posting_id, today).await? {
        println!("{line}");
    }
    Ok(())
}

/// Duplicates a template, advances through every gated step, and submits.
pub(crate) async fn walk_duplicate_flow<T, P>(
    service: &PostingWizardService<T, P>,
    posting_id: &str,
    today: NaiveDate,
) -> Result<Vec<String>, AppError>
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    let mut lines = vec!["Job posting wizard demo".to_string(), "Templates:".to_string()];
    for summary in service.templates(&TemplateFilter::default())? {
        lines.push(format!(
            "  - {} | {} ({}) | {} | created {} | {} question(s)",
            summary.id,
            summary.title,
            summary.city,
            summary.status_label,
            summary.created_on,
            summary.question_count
        ));
    }

    let session = service.create_session();
    let id = session.session_id;
    let view = service.duplicate(&id, posting_id)?;
    lines.push(format!("\nSession {id}: duplicated {posting_id}"));
    lines.push(format!(
        "  step {}/{}: {}",
        view.step_index + 1,
        view.total_steps,
        view.current_step.label()
    ));

    while service.get(&id)?.current_step != WizardStep::last() {
        let view = service.advance(&id, today)?;
        lines.push(format!(
            "  step {}/{}: {}",
            view.step_index + 1,
            view.total_steps,
            view.current_step.label()
        ));
    }

    lines.extend(render_preview(&service.preview(&id)?));
    let screen = service.submit(&id, today).await?;
    lines.extend(render_success(&screen));
    Ok(lines)
}

fn render_preview(preview: &DraftPreview) -> Vec<String> {
    let mut lines = vec!["\nVerification".to_string()];
    for section in &preview.sections {
        lines.push(format!("  {} (edit: {})", section.title, section.edit_step.id()));
        if section.entries.is_empty() {
            lines.push("    (empty)".to_string());
        }
        for entry in &section.entries {
            lines.push(format!("    {}: {}", entry.label, entry.value));
        }
    }
    lines
}

fn render_success(screen: &SuccessScreen) -> Vec<String> {
    vec![
        "\nPosting published".to_string(),
        format!("  id: {}", screen.posting_id),
        format!("  view: {}", screen.posting_path),
        format!("  dashboard: {}", screen.dashboard_path),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PostingWizardService<InMemoryTemplateRepository, SimulatedPublisher> {
        PostingWizardService::new(
            Arc::new(InMemoryTemplateRepository::seeded()),
            Arc::new(SimulatedPublisher::default()),
            WizardConfig {
                submit_delay: Duration::ZERO,
                ..WizardConfig::default()
            },
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[tokio::test]
    async fn every_seeded_template_walks_to_publication() {
        let service = service();
        for posting_id in ["posting-1001", "posting-1002", "posting-1003"] {
            let lines = walk_duplicate_flow(&service, posting_id, today())
                .await
                .expect("demo flow completes");
            assert!(lines.iter().any(|line| line.contains("step 5/5")));
            assert!(lines.iter().any(|line| line == "\nPosting published"));
        }
    }

    #[tokio::test]
    async fn unknown_template_is_an_error() {
        let result = walk_duplicate_flow(&service(), "posting-0", today()).await;
        assert!(matches!(result, Err(AppError::Wizard(_))));
    }
}
