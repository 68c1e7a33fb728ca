use std::sync::LazyLock;

use regex::Regex;

/// Integers, decimals and percentages: `42`, `3.5`, `12%`.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?%?").expect("valid regex"));

/// A currency marker followed by an amount: `R$ 1.200,00`, `$45`, `€3,000`.
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:R\$|US\$|\$|€|£)\s*\d[\d.,]*").expect("valid regex"));

pub const MAX_SCORE: f64 = 100.0;

/// Fixed bonus for the provider a document was discovered through.
pub fn source_trust(source: &str) -> f64 {
    match source {
        "exa" => 10.0,
        crate::types::DEEP_NAVIGATOR_SOURCE => 8.0,
        "google" | "serper" => 6.0,
        _ => 0.0,
    }
}

fn size_points(chars: usize) -> f64 {
    match chars {
        c if c >= 2000 => 25.0,
        c if c >= 1000 => 15.0,
        _ => 5.0,
    }
}

fn density_points(words: usize) -> f64 {
    match words {
        w if w >= 300 => 25.0,
        w if w >= 150 => 15.0,
        _ => 5.0,
    }
}

fn evidence_points(content: &str) -> f64 {
    let numbers = NUMBER_RE.find_iter(content).count() as f64;
    let money = CURRENCY_RE.find_iter(content).count() as f64;
    (numbers * 2.0).min(20.0) + (money * 3.0).min(15.0)
}

/// Heuristic usefulness of extracted text, in `[0, 100]`.
///
/// Size + word density + numeric/currency evidence + source trust. Pure:
/// the same `(content, source)` always scores the same.
pub fn score_content(content: &str, source: &str) -> f64 {
    let chars = content.chars().count();
    let words = content.split_whitespace().count();

    let score =
        size_points(chars) + density_points(words) + evidence_points(content) + source_trust(source);

    score.clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_report(target_chars: usize) -> String {
        let sentence = "Market grew 12% to R$ 450 in 2024. ";
        sentence.repeat(target_chars / sentence.len() + 1)
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = dense_report(2_000);
        assert_eq!(score_content(&text, "exa"), score_content(&text, "exa"));
    }

    #[test]
    fn short_plain_text_gets_floor_points() {
        // 5 size + 5 density, no evidence, unknown source
        assert_eq!(score_content("just a few words here", "blog"), 10.0);
    }

    #[test]
    fn evidence_is_capped() {
        let text = "$1 $2 $3 $4 $5 $6 $7 $8 $9 $10 $11 $12";
        // 5 + 5 + 20 (numbers capped) + 15 (currency capped)
        assert_eq!(score_content(text, "unknown"), 45.0);
    }

    #[test]
    fn dense_trusted_document_scores_high() {
        let text = dense_report(2_000);
        let score = score_content(&text, "exa");
        assert!(score >= 75.0, "score was {score}");
        assert!(score <= MAX_SCORE);
    }

    #[test]
    fn trust_bonus_follows_source_table() {
        let text = "plain words without figures";
        let base = score_content(text, "other");
        assert_eq!(score_content(text, "exa") - base, 10.0);
        assert_eq!(score_content(text, "deep_navigator") - base, 8.0);
        assert_eq!(score_content(text, "serper") - base, 6.0);
        assert_eq!(score_content(text, "google") - base, 6.0);
        assert_eq!(score_content(text, "youtube") - base, 0.0);
    }

    #[test]
    fn score_never_leaves_bounds() {
        let samples = [
            String::new(),
            "x".repeat(10_000),
            dense_report(50_000),
            "€ 9 ".repeat(2_000),
        ];
        for text in &samples {
            for source in ["exa", "deep_navigator", "serper", ""] {
                let s = score_content(text, source);
                assert!((0.0..=MAX_SCORE).contains(&s), "{s} out of range");
            }
        }
    }

    #[test]
    fn size_counts_characters_not_bytes() {
        // 1000 two-byte chars: 2000 bytes but only the 1000-char tier
        let text = "é".repeat(1_000);
        assert_eq!(score_content(&text, "other"), 15.0 + 5.0);
    }
}
