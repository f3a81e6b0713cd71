//! Prompt construction and light post-processing of provider output.

use std::fmt::Write as _;

use compute::market::{AdviceCandidate, MarketStats};
use compute::Valuation;
use model::entities::{business, financial, legal, product, product_legal};
use rust_decimal::Decimal;

pub const INFER_PRODUCTS_PROMPT: &str =
    "Extract product names from this document. Only the product names, separated by comma.";

/// Words that carry no signal when matching a question against businesses.
const STOP_WORDS: &[&str] = &[
    "saya", "ingin", "mau", "invest", "investasi", "bisnis", "usaha", "perusahaan", "di", "pada",
    "dengan", "yang", "dan", "atau", "untuk", "adalah", "ini", "itu", "ada", "tidak", "i", "want",
    "to", "in", "a", "an", "the", "and", "or", "business", "company",
];

/// Businesses described in detail in the advice prompt.
const ADVICE_DETAIL_LIMIT: usize = 6;

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn document_line(legal_type: &str, issued_by: &Option<String>, valid_until: Option<chrono::NaiveDate>) -> String {
    let mut line = legal_type.to_string();
    if let Some(issuer) = issued_by.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(line, " (issued by {})", issuer);
    }
    if let Some(date) = valid_until {
        let _ = write!(line, " [valid until {}]", date.format("%Y-%m-%d"));
    }
    line
}

/// Plain-text description of a business, its documents and each product's documents.
pub fn business_profile(
    business: &business::Model,
    legals: &[legal::Model],
    products: &[(product::Model, Vec<product_legal::Model>)],
) -> String {
    let mut profile = String::new();
    let _ = writeln!(profile, "Business Name: {}", business.name);
    let _ = writeln!(profile, "Business Type: {}", opt(&business.business_type));
    let _ = writeln!(profile, "Industry: {}", opt(&business.industry));
    let _ = writeln!(profile, "Description: {}", opt(&business.description));
    if let Some(founded) = business.founded_at {
        let _ = writeln!(profile, "Founded: {}", founded.format("%Y-%m-%d"));
    }

    profile.push_str("\nCurrent Legal Documents:\n");
    if legals.is_empty() {
        profile.push_str("- No legal documents currently registered\n");
    }
    for doc in legals {
        let _ = writeln!(profile, "- {}", document_line(&doc.legal_type, &doc.issued_by, doc.valid_until));
    }

    profile.push_str("\nProducts:\n");
    if products.is_empty() {
        profile.push_str("- No products registered\n");
    }
    for (product, docs) in products {
        let _ = writeln!(profile, "- Product: {}", product.name);
        if docs.is_empty() {
            profile.push_str("  Legal documents: None\n");
            continue;
        }
        profile.push_str("  Legal documents:\n");
        for doc in docs {
            let _ = writeln!(
                profile,
                "    - {}",
                document_line(&doc.legal_type, &doc.issued_by, doc.valid_until)
            );
        }
    }
    profile
}

pub fn financial_summary(current: Option<&financial::Model>) -> String {
    match current {
        Some(f) => format!(
            "Revenue: {}\nEBITDA: {}\nAssets: {}\nLiabilities: {}\nEquity: {}\nNotes: {}",
            f.revenue,
            f.ebitda,
            f.assets,
            f.liabilities,
            f.equity,
            opt(&f.notes)
        ),
        None => "No structured financial record found for this business.".to_string(),
    }
}

pub fn legal_analysis_prompt(profile: &str) -> String {
    format!(
        r#"You are a business-law expert specialising in Indonesian regulation and compliance. Analyse the business profile below, identify the legal documents it is required to hold, check which of them it already has, and give clear guidance for obtaining the ones it lacks.

**Business Profile:**
{profile}

**Instructions:**
1. Company documents: list the mandatory documents for this kind of business in Indonesia, mark whether each is held, and for each missing one give practical step-by-step guidance numbered from 1.
2. Product documents: for every product in the profile, list the documents Indonesian regulation requires, mark whether each is held, and give numbered steps for each missing one.

Respond with JSON of the form:
{{"required": [{{"type": "Document name", "has_legal": false, "notes": "Status notes", "steps": [{{"step_number": 1, "description": "Step", "redirect_url": "/legal/guide/example"}}]}}],
 "products": [{{"product_name": "Product name", "required": [ ...same shape... ]}}]}}

Only include "steps" when has_legal is false. Use document names as they appear in Indonesian regulation. redirect_url values should look like internal guide links, e.g. /legal/guide/deed-of-establishment."#
    )
}

pub fn suggestions_prompt(profile: &str, financials: &str) -> String {
    format!(
        r#"To complete a business profile on our investment platform, an owner fills in, in this order:
1. trademark rights
2. product documents
3. financial data (as declared in tax reports)

Current data of the business:
{profile}
Latest financials:
{financials}

List what is missing or could be improved. You may improvise a little based on what you know about the company.

Respond with JSON: {{"business_name": "...", "suggestions": [{{"suggestion": "What to do and where to do it", "category": "Legal Documents | Financial Data | Product Information | Profile Completion", "priority": "High | Medium | Low"}}]}}"#
    )
}

pub fn projections_prompt(profile: &str, financials: &str, first_year: i32) -> String {
    format!(
        r#"You are an experienced financial analyst for Indonesian small and medium enterprises. Using the business profile and latest financial summary below, produce a five-year financial projection.

**Business Profile:**
{profile}

**Latest Financial Summary:**
{financials}

Output rules:
- Output valid JSON only, no other text.
- Use numbers for every numeric value, in Rupiah (IDR).
- Exactly five consecutive years, {first_year} through {last_year}.

{{"business_name": "...", "projections": [{{"year": {first_year}, "revenue": 0, "expenses": 0, "net_income": 0, "cash_flow": 0}}]}}"#,
        last_year = first_year + 4
    )
}

/// Split a comma-separated product list. Tolerates the list arriving as a JSON string.
pub fn parse_product_list(raw: &str) -> Vec<String> {
    let text = serde_json::from_str::<String>(raw.trim()).unwrap_or_else(|_| raw.to_string());
    text.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\\').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased words longer than two characters that are not stop words.
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

fn rupiah(value: Decimal) -> String {
    format!("Rp {}", value.round())
}

pub fn investment_advice_prompt(question: &str, candidates: &[AdviceCandidate], stats: &MarketStats) -> String {
    let mut prompt = String::from(
        "You are an experienced investment adviser helping investors find the best small-business opportunities in Indonesia. Use the live market data below to give specific, accurate advice.\n\nCURRENT MARKET OVERVIEW:\n",
    );
    let _ = writeln!(prompt, "- Businesses on the platform: {}", stats.total_businesses);
    let _ = writeln!(prompt, "- Businesses with financial data: {}", stats.businesses_with_financials);
    if !stats.industries.is_empty() {
        prompt.push_str("\n- Industry distribution:\n");
        for (industry, count) in &stats.industries {
            let _ = writeln!(prompt, "  * {}: {} businesses", industry, count);
        }
    }

    prompt.push_str("\nMARKET FINANCIAL AVERAGES:\n");
    let _ = writeln!(prompt, "- Average EBITDA: {}", rupiah(stats.average_ebitda));
    let _ = writeln!(prompt, "- Average revenue: {}", rupiah(stats.average_revenue));
    let _ = writeln!(prompt, "- Average assets: {}", rupiah(stats.average_assets));
    let _ = writeln!(prompt, "- Average equity: {}", rupiah(stats.average_equity));

    prompt.push_str(
        "\nVALUATION RULE: market value = EBITDA x multiplier, where the multiplier is 1 below Rp 1B revenue, 2 up to 5B, 3 up to 10B, 4 up to 50B and 5 above. Non-positive EBITDA means zero value.\n",
    );

    prompt.push_str("\nRELEVANT OPPORTUNITIES:\n");
    if candidates.is_empty() {
        prompt.push_str("- No business currently matches the search criteria.\n");
    }
    for (i, candidate) in candidates.iter().take(ADVICE_DETAIL_LIMIT).enumerate() {
        let b = &candidate.business;
        let _ = writeln!(prompt, "\n{}. {} ({})", i + 1, b.name, opt(&b.industry));
        let _ = writeln!(prompt, "   - Type: {}", opt(&b.business_type));
        let _ = writeln!(prompt, "   - Description: {}", opt(&b.description));
        match &candidate.financial {
            Some(f) => {
                let _ = writeln!(prompt, "   - Revenue: {}", rupiah(f.revenue));
                let _ = writeln!(prompt, "   - EBITDA: {}", rupiah(f.ebitda));
                let _ = writeln!(prompt, "   - Assets: {}", rupiah(f.assets));
                let _ = writeln!(prompt, "   - Equity: {}", rupiah(f.equity));
                let valuation = Valuation::of(f.revenue, f.ebitda);
                let _ = writeln!(prompt, "   - Computed business value: {}", rupiah(valuation.market_cap));
                if f.assets > Decimal::ZERO {
                    let ratio = f.liabilities / f.assets * Decimal::ONE_HUNDRED;
                    let _ = writeln!(prompt, "   - Debt-to-asset ratio: {}%", ratio.round_dp(1));
                }
            }
            None => prompt.push_str("   - Financial data: not yet available\n"),
        }
    }

    let _ = writeln!(prompt, "\nINVESTOR QUESTION: {}", question);
    prompt.push_str(
        "\nRESPONSE INSTRUCTIONS:\n\
         1. Base the advice on the data above.\n\
         2. Name matching businesses and the specific reasons they fit.\n\
         3. Compare against the market averages for context.\n\
         4. Explain risk and potential return from the actual financials.\n\
         5. If the data is insufficient, say what is missing.\n\
         Answer in two or three helpful paragraphs.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn business() -> business::Model {
        let now = Utc::now();
        business::Model {
            id: 1,
            user_id: 1,
            name: "Sambal Bu Rudy".to_string(),
            business_type: Some("CV".to_string()),
            description: Some("Chili paste".to_string()),
            industry: Some("Food".to_string()),
            founded_at: NaiveDate::from_ymd_opt(2019, 5, 1),
            legal_analyzed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_parse_product_list_cleans_names() {
        assert_eq!(
            parse_product_list(r#" "Sambal Ijo", Sambal Bawang ,, "Krupuk" "#),
            vec!["Sambal Ijo", "Sambal Bawang", "Krupuk"]
        );
        assert_eq!(parse_product_list(r#""Tempe, Tahu""#), vec!["Tempe", "Tahu"]);
        assert!(parse_product_list("  ").is_empty());
    }

    #[test]
    fn test_extract_keywords_drops_short_and_stop_words() {
        assert_eq!(
            extract_keywords("Saya ingin invest di bisnis Kopi and bakery ok"),
            vec!["kopi", "bakery"]
        );
        assert!(extract_keywords("the business to a").is_empty());
    }

    #[test]
    fn test_profile_lists_documents_and_products() {
        let now = Utc::now();
        let nib = legal::Model {
            id: 1,
            business_id: 1,
            legal_type: "NIB".to_string(),
            issued_by: Some("OSS".to_string()),
            issued_at: None,
            valid_until: NaiveDate::from_ymd_opt(2030, 1, 31),
            file_name: None,
            file_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let product = product::Model {
            id: 3,
            business_id: 1,
            name: "Sambal Ijo".to_string(),
            description: None,
            category: None,
            unit: None,
            hpp: None,
            revenue: None,
            profit: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let profile = business_profile(&business(), &[nib], &[(product, Vec::new())]);
        assert!(profile.contains("Business Name: Sambal Bu Rudy"));
        assert!(profile.contains("Founded: 2019-05-01"));
        assert!(profile.contains("- NIB (issued by OSS) [valid until 2030-01-31]"));
        assert!(profile.contains("- Product: Sambal Ijo\n  Legal documents: None"));
    }

    #[test]
    fn test_projection_prompt_names_the_year_range() {
        let prompt = projections_prompt("profile", &financial_summary(None), 2027);
        assert!(prompt.contains("2027 through 2031"));
        assert!(prompt.contains("No structured financial record"));
    }

    #[test]
    fn test_advice_prompt_includes_valuation_of_candidates() {
        let now = Utc::now();
        let candidate = AdviceCandidate {
            business: business(),
            financial: Some(financial::Model {
                id: 1,
                business_id: 1,
                revenue: Decimal::from(4_000_000_000i64),
                ebitda: Decimal::from(500_000_000i64),
                assets: Decimal::from(200),
                liabilities: Decimal::from(50),
                equity: Decimal::from(150),
                report_file_url: None,
                notes: None,
                created_at: now,
                updated_at: now,
            }),
        };
        let prompt = investment_advice_prompt("Where to put 10M?", &[candidate], &MarketStats::default());
        assert!(prompt.contains("1. Sambal Bu Rudy (Food)"));
        assert!(prompt.contains("Computed business value: Rp 1000000000"));
        assert!(prompt.contains("Debt-to-asset ratio: 25"));
        assert!(prompt.contains("INVESTOR QUESTION: Where to put 10M?"));
    }
}
