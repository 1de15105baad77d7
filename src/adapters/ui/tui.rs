//! Implements InputPort. Inquire-based interactive flow.
//!
//! Recipients → country → preview → message → strategy → confirm → dispatch →
//! summary → optional CSV export. Values already present in the config skip
//! their prompt.

use crate::adapters::ui::banner::{self, ALERT_RED, AMBER, CHAT_GREEN, TEAL};
use crate::adapters::ui::progress::BarProgress;
use crate::domain::{
    CountryProfile, CountryRegistry, DomainError, EntryStatus, RecipientListBuilder,
    SessionStrategy,
};
use crate::ports::{ChannelDriver, InputPort, InputSourcePort, ReportPort};
use crate::shared::config::AppConfig;
use crate::usecases::{DispatchService, StopSignal};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Select, Text};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_REPORT_FILE: &str = "wpbulk-report.csv";

/// Applies the green theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let accent = Color::Rgb {
        r: CHAT_GREEN.0,
        g: CHAT_GREEN.1,
        b: CHAT_GREEN.2,
    };
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(accent))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(accent))
        .with_answer(StyleSheet::new().with_fg(accent));
    inquire::set_global_render_config(config);
}

fn ui_err(e: inquire::InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Select options as "Name (+CC)", with the index of `default_key`.
fn country_options(registry: &CountryRegistry, default_key: &str) -> (Vec<String>, Vec<String>, usize) {
    let mut labels = Vec::new();
    let mut keys = Vec::new();
    let mut cursor = 0;
    for (i, (key, name)) in registry.list_all().into_iter().enumerate() {
        let code = registry
            .lookup(key)
            .map(|p| p.calling_code.clone())
            .unwrap_or_default();
        labels.push(format!("{} (+{})", name, code));
        keys.push(key.to_string());
        if key.eq_ignore_ascii_case(default_key) {
            cursor = i;
        }
    }
    (labels, keys, cursor)
}

fn strategy_label(strategy: SessionStrategy) -> &'static str {
    match strategy {
        SessionStrategy::Ephemeral => "ephemeral: new browser session per recipient",
        SessionStrategy::Persistent => "persistent: one shared session for the batch",
    }
}

fn status_color(status: &EntryStatus) -> (u8, u8, u8) {
    match status {
        EntryStatus::Sent => CHAT_GREEN,
        EntryStatus::Failed(_) | EntryStatus::Invalid(_) => ALERT_RED,
        EntryStatus::Skipped(_) | EntryStatus::NotAttempted => AMBER,
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    config: Arc<AppConfig>,
    registry: Arc<CountryRegistry>,
    inputs: Arc<dyn InputSourcePort>,
    reports: Arc<dyn ReportPort>,
    driver: Arc<dyn ChannelDriver>,
}

impl TuiInputPort {
    pub fn new(
        config: Arc<AppConfig>,
        registry: Arc<CountryRegistry>,
        inputs: Arc<dyn InputSourcePort>,
        reports: Arc<dyn ReportPort>,
        driver: Arc<dyn ChannelDriver>,
    ) -> Self {
        Self {
            config,
            registry,
            inputs,
            reports,
            driver,
        }
    }

    fn recipients_path(&self) -> Result<PathBuf, DomainError> {
        if let Some(path) = &self.config.recipients_path {
            return Ok(PathBuf::from(path));
        }
        let path = Text::new("Recipients file (one number per line):")
            .prompt()
            .map_err(ui_err)?;
        Ok(PathBuf::from(path.trim()))
    }

    fn country(&self) -> Result<&CountryProfile, DomainError> {
        if let Some(wanted) = &self.config.country {
            return self.registry.resolve(wanted).ok_or_else(|| {
                DomainError::Config(format!("unknown country '{}'", wanted))
            });
        }
        let (labels, keys, cursor) = country_options(&self.registry, self.config.country_or_default());
        let choice = Select::new("Country of the numbers:", labels)
            .with_starting_cursor(cursor)
            .with_page_size(12)
            .raw_prompt()
            .map_err(ui_err)?;
        keys.get(choice.index)
            .and_then(|k| self.registry.lookup(k))
            .ok_or_else(|| DomainError::Ui("country selection out of range".into()))
    }

    async fn message(&self) -> Result<String, DomainError> {
        let inline = self.config.message.as_deref();
        let file = self.config.message_file.as_deref().map(Path::new);
        if inline.is_some() || file.is_some() {
            return self.inputs.read_message(inline, file).await;
        }
        let typed = Text::new("Message:").prompt().map_err(ui_err)?;
        self.inputs.read_message(Some(&typed), None).await
    }

    fn strategy(&self) -> Result<SessionStrategy, DomainError> {
        if self.config.strategy.is_some() {
            return self.config.strategy_or_default();
        }
        let options = [SessionStrategy::Ephemeral, SessionStrategy::Persistent];
        let labels: Vec<&str> = options.iter().map(|s| strategy_label(*s)).collect();
        let choice = Select::new("Session strategy:", labels)
            .raw_prompt()
            .map_err(ui_err)?;
        Ok(options[choice.index])
    }

    fn report_destination(&self) -> Result<Option<PathBuf>, DomainError> {
        if let Some(path) = &self.config.report_path {
            return Ok(Some(PathBuf::from(path)));
        }
        if self.config.assume_yes() {
            return Ok(None);
        }
        let export = Confirm::new("Export the report as CSV?")
            .with_default(false)
            .prompt()
            .map_err(ui_err)?;
        if !export {
            return Ok(None);
        }
        let path = Text::new("Report file:")
            .with_default(DEFAULT_REPORT_FILE)
            .prompt()
            .map_err(ui_err)?;
        Ok(Some(PathBuf::from(path.trim())))
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let path = self.recipients_path()?;
        let raw = self.inputs.read_recipients(&path).await?;
        let profile = self.country()?;

        let attempts = RecipientListBuilder::build(&raw, profile);
        banner::print_colored(&format!("Preview ({}):", profile.name), TEAL);
        for row in RecipientListBuilder::preview_rows(&attempts) {
            println!("{}", row);
        }
        let valid = attempts.iter().filter(|a| a.is_valid()).count();
        if valid == 0 {
            return Err(DomainError::Input(format!(
                "no valid numbers in {}",
                path.display()
            )));
        }

        let message = self.message().await?;
        let strategy = self.strategy()?;
        let service = DispatchService::new(
            Arc::clone(&self.driver),
            self.config.dispatch_config(Some(strategy))?,
        );

        if !self.config.assume_yes() {
            let go = Confirm::new(&format!(
                "Send to {} recipient(s) using the {} strategy?",
                valid, strategy
            ))
            .with_default(false)
            .prompt()
            .map_err(ui_err)?;
            if !go {
                info!("batch cancelled before start");
                return Ok(());
            }
        }

        let stop = StopSignal::new();
        let on_interrupt = {
            let stop = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("stop requested; finishing the current recipient");
                    stop.stop();
                }
            })
        };
        let progress = BarProgress::new();
        let report = service
            .run_attempts(attempts, &message, &progress, &stop)
            .await;
        on_interrupt.abort();

        let lines = report.summary_lines();
        let entries = report.entries();
        let head = lines.len().saturating_sub(entries.len());
        for (i, line) in lines.iter().enumerate() {
            let color = match i.checked_sub(head) {
                Some(idx) => status_color(&entries[idx].status),
                None if i > 0 => ALERT_RED,
                None => TEAL,
            };
            banner::print_colored(line, color);
        }

        if let Some(dest) = self.report_destination()? {
            let written = self.reports.save_report(&report, &dest).await?;
            banner::print_colored(&format!("Report written to {}", written.display()), TEAL);
        }

        match report.fatal_error {
            Some(reason) => Err(DomainError::Driver(format!("batch aborted: {}", reason))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_options_cursor_on_default() {
        let registry = CountryRegistry::builtin().unwrap();
        let (labels, keys, cursor) = country_options(&registry, "tr");
        assert_eq!(labels.len(), registry.len());
        assert_eq!(keys[cursor], "tr");
        assert_eq!(labels[cursor], "Turkey (+90)");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(&EntryStatus::Sent), CHAT_GREEN);
        assert_eq!(status_color(&EntryStatus::Invalid("x".into())), ALERT_RED);
        assert_eq!(status_color(&EntryStatus::NotAttempted), AMBER);
    }
}
