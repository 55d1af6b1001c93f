use console::style;

use crate::ai::ProviderHealth;
use crate::storage::{HealthStatus, StoreHealth, StoredIdea};
use crate::types::{BusinessIdea, Horizon, MarketRisk};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Full human-readable rendering of one idea
    pub fn idea(&self, idea: &BusinessIdea) {
        self.header(idea.title());
        println!("{}", style(idea.id()).dim());
        println!();
        println!("  Category:  {}", idea.category());
        println!("  Risk:      {}", risk_label(idea.market_risk()));
        println!("  Budget:    {}", idea.initial_budget());
        println!("  Skills:    {}", skills_line(idea));
        println!();
        println!("{}", idea.description());

        self.section("Timeframe");
        for horizon in Horizon::ALL {
            println!(
                "  {:<12} {}",
                style(horizon.span()).cyan(),
                idea.timeframe().get(horizon)
            );
        }

        for (_, section) in idea.plan().sections() {
            self.section(&section.title);
            println!("{}", section.content);
        }
        println!();
    }

    /// One line per stored idea
    pub fn idea_list(&self, ideas: &[StoredIdea]) {
        if ideas.is_empty() {
            self.info("No ideas stored yet. Run 'bizplan generate --save' to create one.");
            return;
        }

        for stored in ideas {
            let idea = &stored.idea;
            println!(
                "{}  {}  {} / {}  {}",
                style(idea.id()).dim(),
                stored.created_at.format("%Y-%m-%d %H:%M"),
                idea.category(),
                risk_label(idea.market_risk()),
                style(idea.title()).bold()
            );
        }
        println!();
        println!("{} idea(s)", ideas.len());
    }

    pub fn provider_health(&self, providers: &[ProviderHealth]) {
        self.section("Providers");
        if providers.is_empty() {
            self.warning("No providers configured");
            return;
        }
        for provider in providers {
            let line = format!("{} ({})", provider.name, provider.model);
            if provider.available {
                self.success(&line);
            } else {
                self.error(&format!("{} unreachable", line));
            }
        }
    }

    pub fn store_health(&self, backend: &str, health: &StoreHealth) {
        self.section("Storage");
        let line = format!("{}: {} ({})", backend, health.status, health.details);
        match health.status {
            HealthStatus::Healthy => self.success(&line),
            HealthStatus::Degraded => self.warning(&line),
            HealthStatus::Unhealthy => self.error(&line),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn risk_label(risk: MarketRisk) -> String {
    match risk {
        MarketRisk::Low => style(risk.as_str()).green().to_string(),
        MarketRisk::Medium => style(risk.as_str()).yellow().to_string(),
        MarketRisk::High => style(risk.as_str()).red().to_string(),
    }
}

fn skills_line(idea: &BusinessIdea) -> String {
    if idea.skills().is_empty() {
        "-".to_string()
    } else {
        idea.skills().iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
