//! Burn rate, feedback and intensity commands

use anyhow::Result;
use burnrate_core::burn::{round2, GroupBurnRate, TrendArrow};
use burnrate_core::models::SpendingGroup;
use burnrate_core::{BurnRateConfig, BurnRateEngine, Database};
use chrono::Local;

pub fn cmd_burn(
    db: &Database,
    config: &BurnRateConfig,
    intensity: Option<f64>,
    json: bool,
) -> Result<()> {
    let engine = BurnRateEngine::new(db, config);
    let report = engine.compute(intensity, Local::now().date_naive())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (group, burn) in &report {
        print_group(*group, burn);
    }

    Ok(())
}

fn arrow_symbol(arrow: TrendArrow) -> &'static str {
    match arrow {
        TrendArrow::Improving => "↘ improving",
        TrendArrow::Worsening => "↗ worsening",
        TrendArrow::Stable => "→ stable",
        TrendArrow::Neutral => "· neutral",
    }
}

fn print_group(group: SpendingGroup, burn: &GroupBurnRate) {
    println!();
    println!("🔥 {} (intensity {:.2})", group, burn.intensity);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Reference rate: ${:.2}/day",
        round2(burn.current_reference_rate)
    );
    if group.is_adaptive() {
        println!("   Target:         ${:.2}/day", round2(burn.target));
    }
    println!("   Trend:          {}", arrow_symbol(burn.arrow));
    println!(
        "   Signal ends at: {} days (showing {}-{})",
        burn.flat_boundary, burn.visible_range[0], burn.visible_range[1]
    );

    let [start, end] = burn.visible_range;
    for point in burn
        .curve
        .iter()
        .filter(|p| p.window >= start && p.window <= end)
    {
        let marker = if point.deviation > 0.0 { "▲" } else { " " };
        println!(
            "   {:>3}d │ ${:>8.2} {} {:+.2}",
            point.window,
            round2(point.daily_rate),
            marker,
            round2(point.deviation)
        );
    }
}

pub fn cmd_feedback(
    db: &Database,
    config: &BurnRateConfig,
    group: &str,
    sentiment: &str,
) -> Result<()> {
    let engine = BurnRateEngine::new(db, config);
    let outcome = engine.submit_feedback(group, sentiment, Local::now().date_naive())?;

    db.log_audit(
        "cli",
        "feedback",
        Some("burn_rate"),
        None,
        Some(&format!(
            "group={}, sentiment={}, new_target={:?}",
            group, sentiment, outcome.new_target
        )),
    )?;

    println!(
        "✅ Recorded '{}' for {} at ${:.2}/day",
        sentiment,
        group,
        round2(outcome.rate_at_feedback)
    );
    match outcome.new_target {
        Some(target) => println!("   New daily target: ${:.2}", round2(target)),
        None => println!("   Target unchanged"),
    }

    Ok(())
}

pub fn cmd_intensity(db: &Database, config: &BurnRateConfig, value: Option<f64>) -> Result<()> {
    let engine = BurnRateEngine::new(db, config);

    match value {
        Some(value) => {
            let stored = engine.set_intensity(value)?;
            db.log_audit(
                "cli",
                "update",
                Some("setting"),
                None,
                Some(&format!("curve_intensity={}", stored)),
            )?;
            println!("✅ Curve intensity set to {:.2}", stored);
        }
        None => {
            let stored = engine.stored_intensity()?;
            println!("Curve intensity: {:.2}", stored);
            println!("   0 = gentle (long memory), 1 = responsive (recent days dominate)");
        }
    }

    Ok(())
}
