//! Optional integrations, resolved once at startup.
//!
//! Reports that can use an external feed take a `&dyn ExternalTrendSource`.
//! When nothing is configured the [`NoExternalTrends`] source is used; it
//! reports no styles, so correlation yields no matches and no opportunities.

use crate::config::settings::AppConfig;
use tracing::info;

/// A feed of art styles trending outside the marketplace.
pub trait ExternalTrendSource: Send + Sync {
    /// Short identifier shown in reports
    fn name(&self) -> &str;

    /// Style names currently trending, most relevant first
    fn trending_styles(&self) -> Vec<String>;
}

/// Source used when no external feed is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalTrends;

impl ExternalTrendSource for NoExternalTrends {
    fn name(&self) -> &str {
        "none"
    }

    fn trending_styles(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A fixed list of styles, typically maintained by an operator in config.toml.
#[derive(Debug, Clone, Default)]
pub struct StaticTrendSource {
    styles: Vec<String>,
}

impl StaticTrendSource {
    /// Source reporting exactly `styles`, in order.
    #[must_use]
    pub fn new<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            styles: styles.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExternalTrendSource for StaticTrendSource {
    fn name(&self) -> &str {
        "config"
    }

    fn trending_styles(&self) -> Vec<String> {
        self.styles.clone()
    }
}

/// Integrations available to this process.
pub struct Capabilities {
    /// Where external trend styles come from
    pub external_trends: Box<dyn ExternalTrendSource>,
}

impl Capabilities {
    /// Picks an implementation for every optional integration.
    #[must_use]
    pub fn resolve(config: &AppConfig) -> Self {
        let styles = &config.external_trends.styles;
        let external_trends: Box<dyn ExternalTrendSource> = if styles.is_empty() {
            Box::new(NoExternalTrends)
        } else {
            Box::new(StaticTrendSource::new(styles.iter().cloned()))
        };

        info!("External trend source: {}", external_trends.name());
        Self { external_trends }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            external_trends: Box::new(NoExternalTrends),
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("external_trends", &self.external_trends.name())
            .finish()
    }
}
