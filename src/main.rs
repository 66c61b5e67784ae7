use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vortex_insights::config::database::{create_connection, create_tables};
use vortex_insights::config::settings::{AppConfig, load_default_config};
use vortex_insights::config::store::DbConfigStore;
use vortex_insights::core::agent::{self, Agent};
use vortex_insights::core::capability::Capabilities;
use vortex_insights::core::insights::{Insight, InsightBus};
use vortex_insights::core::period::Period;
use vortex_insights::core::report::{
    Response, format_currency, format_growth, format_percent, respond, respond_data,
};
use vortex_insights::core::{access, audience, pricing, social, trends};
use vortex_insights::errors::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so DATABASE_URL and VORTEX_CONFIG are visible to everything below
    dotenv().ok();

    let app_config = load_default_config()?;

    let default_filter = if app_config.reporting.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let cli = Cli::parse();

    let db = create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let capabilities = Capabilities::resolve(&app_config);
    let bus = InsightBus::default();
    let mut strategist = bus.subscribe(Agent::BusinessStrategist);

    let context = Context {
        db,
        config: app_config,
        capabilities,
        bus,
    };
    let output = run(cli.command, &context).await?;
    println!("{output}");

    for message in strategist.drain() {
        info!("Insight from {}: {:?}", message.source, message.insight);
    }

    Ok(())
}

/// Reporting and tuning commands for the marketplace database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct PeriodArgs {
    /// Reporting window: day, week, month, quarter or year.
    #[arg(long)]
    period: Option<Period>,
}

#[derive(Subcommand)]
enum Commands {
    /// Styles ranked by engagement score.
    PopularStyles(PeriodArgs),
    /// Styles whose purchases grew against the previous window.
    EmergingStyles(PeriodArgs),
    /// Share, click and engagement growth per social platform.
    PlatformTrends(PeriodArgs),
    /// Monthly revenue history with a six month projection.
    RevenueProjection,
    /// Revenue of the window against the previous one.
    RevenueGrowth(PeriodArgs),
    /// Completed revenue from one date (inclusive) to another (exclusive).
    Revenue {
        /// First day, as YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Day after the last, as YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
    /// Search terms rising against the previous window, and new ones.
    SearchTrends(PeriodArgs),
    /// Artworks spreading fastest through social sharing.
    ViralContent(PeriodArgs),
    /// Sharing totals per platform and the most shared artworks.
    SharingAnalytics(PeriodArgs),
    /// Categories with the widest spread of listing prices.
    PriceGaps,
    /// Internal popular styles against the external trend feed.
    CorrelateTrends(PeriodArgs),
    /// Correlation between price and views within a category.
    PriceCorrelation {
        #[arg(long)]
        category: String,
    },
    /// Views, cart additions and purchases with their ratios.
    Funnel(PeriodArgs),
    /// Cart abandonment and recovery rates.
    AbandonedCarts(PeriodArgs),
    /// Cart conversion per cart total range.
    PriceSensitivity(PeriodArgs),
    /// Retention of newly registered members.
    Retention(PeriodArgs),
    /// Price elasticity of a category.
    Elasticity {
        #[arg(long)]
        category: String,
    },
    /// Reputation factor of an artist.
    ArtistReputation {
        #[arg(long)]
        artist: i64,
    },
    /// Recommended price for an artwork.
    PriceRecommendation {
        #[arg(long)]
        artwork: i64,
    },
    /// Sales, bracket conversion and suggested price for an artist.
    ArtistPricing {
        #[arg(long)]
        artist: i64,
    },
    /// Stores an agent's learning rate, in (0, 1].
    SetLearningRate {
        #[arg(long, value_parser = parse_agent)]
        agent: Agent,
        #[arg(long)]
        rate: f64,
    },
    /// Stores an agent's context window, in [100, 10000].
    SetContextWindow {
        #[arg(long, value_parser = parse_agent)]
        agent: Agent,
        #[arg(long)]
        size: i64,
    },
    /// Checks a key against the configured API key.
    CheckApiKey {
        #[arg(long)]
        key: Option<String>,
    },
}

fn parse_agent(value: &str) -> std::result::Result<Agent, String> {
    Agent::ALL
        .into_iter()
        .find(|agent| agent.slug() == value.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown agent '{value}'"))
}

struct Context {
    db: DatabaseConnection,
    config: AppConfig,
    capabilities: Capabilities,
    bus: InsightBus,
}

impl Context {
    fn period(&self, args: &PeriodArgs) -> Period {
        args.period.unwrap_or(self.config.reporting.default_period)
    }
}

#[derive(Serialize)]
struct Applied {
    applied: bool,
}

#[derive(Serialize)]
struct Access {
    authorized: bool,
}

fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn render<T: Serialize>(response: &Response<T>) -> Result<String> {
    response.to_json()
}

async fn run(command: Commands, ctx: &Context) -> Result<String> {
    let db = &ctx.db;
    let now = Utc::now();
    let limit = ctx.config.reporting.top_limit;

    match command {
        Commands::PopularStyles(args) => {
            let result = trends::popular_styles(db, ctx.period(&args), now, limit).await;
            if let Ok(styles) = &result {
                for style in styles {
                    ctx.bus.publish(
                        Agent::Huraii,
                        Insight::ContentPerformance {
                            style: style.style.clone(),
                            engagement_score: style.engagement_score,
                        },
                    );
                }
            }
            render(&respond_data(result))
        }
        Commands::EmergingStyles(args) => render(&respond_data(
            trends::emerging_styles(db, ctx.period(&args), now, &ctx.bus).await,
        )),
        Commands::PlatformTrends(args) => render(&respond_data(
            trends::platform_trends(db, ctx.period(&args), now).await,
        )),
        Commands::RevenueProjection => render(&respond(trends::revenue_projection(db).await)),
        Commands::RevenueGrowth(args) => {
            let result = trends::revenue_growth(db, ctx.period(&args), now).await;
            if let Ok(growth) = &result {
                info!(
                    "Revenue this {}: {} ({})",
                    growth.period,
                    format_currency(growth.current_revenue),
                    format_growth(growth.growth_percentage)
                );
            }
            render(&respond(result))
        }
        Commands::Revenue { from, to } => render(&respond(
            trends::revenue_in_range(db, start_of_day(from), start_of_day(to)).await,
        )),
        Commands::SearchTrends(args) => render(&respond(
            trends::trending_search_terms(db, ctx.period(&args), now).await,
        )),
        Commands::ViralContent(args) => render(&respond_data(
            social::viral_content(db, ctx.period(&args), now).await,
        )),
        Commands::SharingAnalytics(args) => render(&respond(
            social::sharing_analytics(db, ctx.period(&args), now).await,
        )),
        Commands::PriceGaps => render(&respond_data(pricing::price_gaps(db).await)),
        Commands::CorrelateTrends(args) => render(&respond(
            trends::correlate_trends(
                db,
                ctx.period(&args),
                now,
                limit,
                ctx.capabilities.external_trends.as_ref(),
            )
            .await,
        )),
        Commands::PriceCorrelation { category } => render(&respond(
            trends::price_interest_correlation(db, &category).await,
        )),
        Commands::Funnel(args) => {
            let result = audience::purchase_funnel(db, ctx.period(&args), now).await;
            if let Ok(funnel) = &result {
                info!(
                    "View to purchase: {}",
                    format_percent(funnel.view_to_purchase * 100.0)
                );
            }
            render(&respond(result))
        }
        Commands::AbandonedCarts(args) => render(&respond(
            audience::abandoned_carts(db, ctx.period(&args), now).await,
        )),
        Commands::PriceSensitivity(args) => render(&respond_data(
            audience::price_sensitivity(db, ctx.period(&args), now).await,
        )),
        Commands::Retention(args) => render(&respond(
            audience::retention_rates(db, ctx.period(&args), now).await,
        )),
        Commands::Elasticity { category } => render(&respond(
            pricing::price_elasticity_for_category(db, &category).await,
        )),
        Commands::ArtistReputation { artist } => {
            render(&respond(pricing::artist_reputation(db, artist).await))
        }
        Commands::PriceRecommendation { artwork } => render(&respond(
            pricing::artwork_price_recommendation(db, artwork, &ctx.config.pricing.medium_factors)
                .await,
        )),
        Commands::ArtistPricing { artist } => {
            render(&respond(pricing::artist_pricing_overview(db, artist).await))
        }
        Commands::SetLearningRate { agent, rate } => {
            let store = DbConfigStore::new(db.clone());
            let applied = agent::apply_learning_rate(&store, agent, rate).await;
            render(&respond(Ok(Applied { applied })))
        }
        Commands::SetContextWindow { agent, size } => {
            let store = DbConfigStore::new(db.clone());
            let applied = agent::apply_context_window(&store, agent, size).await;
            render(&respond(Ok(Applied { applied })))
        }
        Commands::CheckApiKey { key } => {
            let store = DbConfigStore::new(db.clone());
            let result = access::check_api_key(&store, key.as_deref())
                .await
                .map(|authorized| Access { authorized });
            render(&respond(result))
        }
    }
}
