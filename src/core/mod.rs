/// API key verification
pub mod access;

/// AI agent identities and their tunable parameters
pub mod agent;

/// Purchase funnel, cart and retention reports
pub mod audience;

/// Price brackets and cart price ranges
pub mod brackets;

/// Pure ratio, growth and score calculations
pub mod calc;

/// Optional integrations resolved at startup
pub mod capability;

/// Cross-agent insight broadcasting
pub mod insights;

/// Raw metric extraction queries
pub mod metrics;

/// Reporting periods and time windows
pub mod period;

/// Price elasticity, artist reputation and price recommendations
pub mod pricing;

/// Response envelope and display formatting
pub mod report;

/// Viral content and social sharing reports
pub mod social;

/// Style, platform and revenue trend reports
pub mod trends;
