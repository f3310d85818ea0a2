// Disclosure Watch - Core Library
// Asset-disclosure classification and ranking for legislators and officials.
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod disclosure;     // Raw line items + JSON source documents
pub mod profiles;       // Legislator profile lookup
pub mod rules;          // Classification rules (ordered, first match wins)
pub mod reconciliation; // Rebuild missing current values
pub mod aggregation;    // Bucket totals, net worth, change
pub mod money;          // 억/만 formatting
pub mod ranking;        // Ranking, search, person lookup
pub mod cache;          // Per-population summary cache
pub mod comments;       // Threaded comments (SQLite)
pub mod export;         // Ranking → CSV
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use disclosure::{
    DataSources, DisclosureRecord, Population, RawLineItem,
    load_assembly, load_officials, parse_assembly, parse_officials,
};
pub use profiles::{Labels, ProfileIndex, ProfileRow, load_profiles};
pub use rules::{Bucket, ClassificationResult, ClassificationRule, RuleEngine, classify};
pub use reconciliation::{ReconciliationOutcome, reconcile_current_value};
pub use aggregation::{AssetBreakdown, PersonSummary, aggregate, aggregate_with};
pub use money::{format_change, format_compact, format_money};
pub use ranking::{PartyColor, RankedMember, find_person, party_color, rank, search};
pub use cache::SummaryCache;
pub use comments::{
    Comment, CommentError, CommentThread, NewComment,
    delete_comment, insert_comment, list_comments, setup_comments, thread_comments,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
