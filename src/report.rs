use std::fmt::Write;

use chrono::NaiveDate;
use harvest_advisor::{Analysis, InfrastructureChoice, StrategyOption};

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn build_report(analysis: &Analysis, generated_on: Option<NaiveDate>) -> String {
    let mut output = String::new();
    let assessment = &analysis.assessment;
    let recommendation = &analysis.recommendation;

    let _ = writeln!(output, "# Post-Harvest Decision Report: {}", analysis.commodity);
    let _ = writeln!(
        output,
        "Target month {} (perishability {})",
        month_name(analysis.target_month),
        analysis.perishability
    );
    if let Some(date) = generated_on {
        let _ = writeln!(output, "Generated on {date}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Seasonal Baseline");
    let _ = writeln!(output, "| Month | Average price | Observations |");
    let _ = writeln!(output, "|---|---|---|");

    for (month, entry) in analysis.baseline.months.iter() {
        let marker = if *month == analysis.target_month { " *" } else { "" };
        let _ = writeln!(
            output,
            "| {}{} | {:.2} | {} |",
            month_name(*month),
            marker,
            entry.average_price,
            entry.observations
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Price Health");
    let _ = writeln!(
        output,
        "- Current price {:.2} against seasonal {:.2} ({:+.1}%)",
        assessment.current_price, assessment.seasonal_price, assessment.deviation_pct
    );
    let _ = writeln!(output, "- Risk tier: {}", assessment.risk_tier);
    let _ = writeln!(
        output,
        "- Market health: {}/100 ({})",
        assessment.health_score, assessment.health_label
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");
    let _ = writeln!(
        output,
        "- {} via {}",
        recommendation.action, recommendation.infrastructure
    );
    let _ = writeln!(output, "- Timeframe: {}", recommendation.timeframe);
    let _ = writeln!(output, "- Reason: {}", recommendation.reason);

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Cost-Benefit (per {} units)",
        analysis.comparison.reference_quantity
    );

    for entry in analysis.comparison.entries.iter() {
        let marker = if entry.option == analysis.comparison.best {
            " (best)"
        } else {
            ""
        };
        let _ = writeln!(output, "- {}: {:.2}{}", entry.option, entry.net_value, marker);
    }

    if analysis.comparison.best != StrategyOption::SellNow
        && recommendation.infrastructure == InfrastructureChoice::FreshMarketSale
    {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Note: {} has the higher modelled payoff even though prices are near the seasonal norm.",
            analysis.comparison.best
        );
    }

    output
}
