use std::fmt::Write as _;

use crate::scoring::{VentureAssessment, ANALYST_WEIGHT, UNIT_WEIGHT, VISIONARY_WEIGHT};

/// Renders an assessment as the plain-text dashboard read-out.
///
/// Analyst and final scores are truncated toward zero for display, margins are
/// printed to two decimals.
pub fn render_report(assessment: &VentureAssessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Visionary Score: {}/100", assessment.visionary_score);
    let _ = writeln!(
        out,
        "Analyst Score: {:.0}/100",
        assessment.analyst_score.trunc()
    );
    let _ = writeln!(out, "Unit Score: {}/100", assessment.unit_score);
    let _ = writeln!(
        out,
        "Final Venture Score: {:.0} / 100",
        assessment.final_score.trunc()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "VERDICT: {}", assessment.verdict.headline());
    let _ = writeln!(out, "{}", assessment.verdict.explanation());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Contribution Margin: ${:.2}",
        assessment.contribution_margin
    );
    let _ = writeln!(
        out,
        "Net Profit on First Unit: ${:.2}",
        assessment.net_unit_profit
    );
    let _ = write!(
        out,
        "Visionary Weight: {:.0}% | Analyst Weight: {:.0}% | Economics Weight: {:.0}%",
        VISIONARY_WEIGHT * 100.0,
        ANALYST_WEIGHT * 100.0,
        UNIT_WEIGHT * 100.0
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{AssetIntensity, Inevitability, ValueChainPosition, VentureInput};
    use crate::scoring::score;

    #[test]
    fn truncates_scores_and_formats_money() {
        let input = VentureInput::new(
            3.0,
            Inevitability::None,
            ValueChainPosition::Commodity,
            AssetIntensity::Heavy,
            100.0,
            60.0,
            20.0,
        );
        let report = render_report(&score(&input));

        assert!(report.contains("Visionary Score: -10/100"));
        assert!(report.contains("Analyst Score: 6/100"));
        assert!(report.contains("Unit Score: 100/100"));
        assert!(report.contains("Final Venture Score: 38 / 100"));
        assert!(report.contains("VERDICT: NO GO"));
        assert!(report.contains("Pivot required."));
        assert!(report.contains("Contribution Margin: $40.00"));
        assert!(report.contains("Net Profit on First Unit: $20.00"));
        assert!(report
            .ends_with("Visionary Weight: 30% | Analyst Weight: 30% | Economics Weight: 40%"));
    }

    #[test]
    fn negative_margins_keep_their_sign() {
        let input = VentureInput::new(
            10.0,
            Inevitability::Maybe,
            ValueChainPosition::Aggregator,
            AssetIntensity::Medium,
            50.0,
            55.0,
            5.0,
        );
        let report = render_report(&score(&input));

        assert!(report.contains("Contribution Margin: $-5.00"));
        assert!(report.contains("Net Profit on First Unit: $-10.00"));
        assert!(report.contains("Analyst Score: 75/100"));
    }
}
