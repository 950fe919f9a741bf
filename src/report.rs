//! Human-readable rendering of aggregates and alerts.
//!
//! Markdown output aimed at chat transports; ASCII labels keep console and
//! test output stable.

use crate::aggregate::AggregateResult;
use crate::notify::AlertEvent;

/// Text label for a score, in fixed bands.
pub fn sentiment_label(score: f64) -> &'static str {
    if score >= 0.3 {
        "Very Bullish"
    } else if score >= 0.1 {
        "Bullish"
    } else if score >= -0.1 {
        "Neutral"
    } else if score >= -0.3 {
        "Bearish"
    } else {
        "Very Bearish"
    }
}

/// Full sentiment report for one subject's aggregate.
pub fn format_sentiment_report(subject: &str, agg: &AggregateResult) -> String {
    let label = sentiment_label(agg.mean_polarity);
    format!(
        "*Sentiment Report: {}*\n\n\
         *Overall:* {} ({:+.2})\n\
         *Weighted Score:* {:+.2}\n\n\
         *Breakdown:*\n\
         - Positive: {}%\n\
         - Neutral: {}%\n\
         - Negative: {}%\n\n\
         _Based on {} posts from the last 24h_",
        subject.to_uppercase(),
        label,
        agg.mean_polarity,
        agg.weighted_mean_polarity,
        agg.positive_pct,
        agg.neutral_pct,
        agg.negative_pct,
        agg.sample_size,
    )
}

/// Alert message for a threshold breach.
pub fn format_alert_message(event: &AlertEvent) -> String {
    format!(
        "*Sentiment Alert: {}*\n\n\
         Sentiment has {} significantly!\n\
         Previous: {:.2} -> Current: {:.2}",
        event.subject.to_uppercase(),
        event.direction,
        event.previous_score,
        event.current_score,
    )
}
