//! Prompt templates, system instructions and canned user-facing messages.

use nexus_core::constants::PULSE_DEAL_COUNT;
use nexus_core::{Category, PlacementMode};

// ============================================================================
// DEEP SCAN
// ============================================================================

pub fn deep_scan(query: &str) -> String {
    format!(
        "Perform a retail deep-scan for: \"{}\" in South Africa. Locate live stock, current prices, and active promo codes.",
        query
    )
}

pub fn format_scan(raw: &str) -> String {
    format!("Format this search intelligence: {}", raw)
}

pub const FORMATTER_SYSTEM: &str = "You are the Nexus Formatting Node. Your ONLY job is to take raw data and output it as beautiful, structured Markdown.
1. Use BOLD for retailer names.
2. Use a Markdown Table if price comparisons for multiple retailers exist.
3. Use distinct bullet points for item features or \"Pro Tips\".
4. Ensure headers use ### for visual hierarchy.
5. Keep it clean and professional.";

pub const SCAN_EMPTY: &str = "Scan complete. No data formatted.";
pub const SCAN_BLANK_QUERY: &str = "Enter an item to scan.";
pub const SCAN_RATE_LIMITED: &str =
    "Intelligence nodes are currently at max capacity. Please wait a few seconds and try your scan again.";
pub const SCAN_INTERRUPTED: &str =
    "Scan link interrupted. Our high-speed nodes are recycling. Please try again.";
pub const RETAILER_SOURCE: &str = "Retailer Source";

// ============================================================================
// PRICE COMPARISON
// ============================================================================

pub fn price_comparison(query: &str) -> String {
    format!(
        "Search for real-time prices for \"{}\" in South Africa. Compare Takealot, Makro, Checkers, and PEP.",
        query
    )
}

pub const ANALYST_SYSTEM: &str =
    "You are a Retail Analyst. Use a Markdown table. Bold the best ZAR price.";
pub const PRICE_EMPTY: &str = "No intelligence found.";
pub const PRICE_FAILED: &str = "[ERROR]: Intelligence link failure.";

// ============================================================================
// PLACEMENT
// ============================================================================

pub fn placement(province: &str, status: &str, mode: PlacementMode, context: &str) -> String {
    match mode {
        PlacementMode::Advice => format!(
            "Provide strategic advice for a parent whose school placement status is \"{}\" in {}. Context: {}.",
            status, province, context
        ),
        PlacementMode::Appeal => format!(
            "Draft a professional Appeal Letter template for a school rejection in {}. Parent's situation: {}.",
            province, context
        ),
        PlacementMode::Availability => format!(
            "Search for public schools in {} that still have active waiting lists or late registration for 2025/2026.",
            province
        ),
    }
}

pub const ADVOCATE_SYSTEM: &str = "You are the \"Nexus Strategic Advocate\". Perfectly organized output only.
1. Structure with ### HEADERS.
2. **Bold critical terms**.
3. Use bulleted lists for steps.
4. Cite specific DOE/SA Schools Act sections where applicable.";

pub const PLACEMENT_EMPTY: &str = "NO_STRATEGIC_DATA";
pub const PLACEMENT_BLANK_PROVINCE: &str = "Select a province to request placement intelligence.";
pub const PLACEMENT_RATE_LIMITED: &str = "### [SYSTEM ALERT]: NODE RECYCLING\nThe Strategic Advice Node is currently under heavy load (Quota 429). \n\nPlease wait 60 seconds for the Department of Education data link to reset.";
pub const PLACEMENT_INTERRUPTED: &str = "### [SIGNAL ERROR]: INTERRUPTED\nConnection to strategic portals lost. Re-attempt advised in 5 minutes.";
pub const DEPARTMENT_SOURCE: &str = "Department Source";

// ============================================================================
// MARKETPLACE
// ============================================================================

pub fn book_suggestions(title: &str) -> String {
    format!("List 5 common SA textbook titles for: \"{}\".", title)
}

pub fn safety_check(title: &str, category: Category) -> String {
    format!(
        "Safety check for: {} (listed under {}). Return JSON {{safe: bool, reason: string}}.",
        title, category
    )
}

// ============================================================================
// PULSE
// ============================================================================

pub fn pulse_scout() -> String {
    format!(
        "Find {} major 'Back to School' deals currently live in South Africa. Return only Item, Price in ZAR, and Retailer.",
        PULSE_DEAL_COUNT
    )
}

pub fn pulse_structure(raw: &str) -> String {
    format!(
        "Transform this data into a JSON array of {} objects.\nKeys: title, price, retailer, savingReason, category (Textbooks, Uniforms, Stationery).\nData: {}",
        PULSE_DEAL_COUNT, raw
    )
}

pub const UNIFORMS_IMAGE: &str =
    "https://images.unsplash.com/photo-1523240795612-9a054b0db644?q=80&w=600";
pub const TEXTBOOKS_IMAGE: &str =
    "https://images.unsplash.com/photo-1497633762265-9d179a990aa6?q=80&w=600";
pub const STATIONERY_IMAGE: &str =
    "https://images.unsplash.com/photo-1456735190827-d1262f71b8a3?q=80&w=600";
