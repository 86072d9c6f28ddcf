//! Backtest report export: JSON, a CSV signal tape and a console summary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use smc_core::backtest::{BacktestReport, TradeOutcome};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize backtest report to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per labelled signal.
///
/// Columns: created_at, symbol, timeframe, side, entry, stop_loss,
/// take_profit, risk_reward, score, confidence, category, outcome, bars,
/// confluences
pub fn export_signals_csv(report: &BacktestReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "created_at",
        "symbol",
        "timeframe",
        "side",
        "entry",
        "stop_loss",
        "take_profit",
        "risk_reward",
        "score",
        "confidence",
        "category",
        "outcome",
        "bars",
        "confluences",
    ])?;

    for s in &report.signals {
        let c = &s.candidate;
        let confluences: Vec<&str> = c.confluences.iter().map(|t| t.as_str()).collect();
        wtr.write_record([
            &c.created_at.to_rfc3339(),
            &c.symbol,
            c.timeframe.as_str(),
            c.side.as_str(),
            &format!("{:.6}", c.entry),
            &format!("{:.6}", c.stop_loss),
            &format!("{:.6}", c.take_profit),
            &format!("{:.2}", c.risk_reward),
            &c.score.to_string(),
            &format!("{:.2}", c.confidence),
            c.category.as_str(),
            outcome_str(s.outcome),
            &s.bars.to_string(),
            &confluences.join("+"),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn outcome_str(outcome: TradeOutcome) -> &'static str {
    match outcome {
        TradeOutcome::Win => "win",
        TradeOutcome::Loss => "loss",
        TradeOutcome::Expired => "expired",
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `report.json` and `signals.csv` into `{output_dir}/{label}/`.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path, label: &str) -> Result<PathBuf> {
    let run_dir = output_dir.join(label);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)
        .context("failed to write report.json")?;
    std::fs::write(run_dir.join("signals.csv"), export_signals_csv(report)?)
        .context("failed to write signals.csv")?;

    Ok(run_dir)
}

// ─── Console summary ────────────────────────────────────────────────

pub fn print_summary(symbol: &str, report: &BacktestReport) {
    println!();
    println!("=== Walk-forward Result ===");
    println!("Symbol:         {symbol}");
    println!("Windows:        {}", report.windows);
    println!("Signals:        {}", report.signals.len());
    println!("Wins:           {}", report.count(TradeOutcome::Win));
    println!("Losses:         {}", report.count(TradeOutcome::Loss));
    println!("Expired:        {}", report.count(TradeOutcome::Expired));
    match report.win_rate() {
        Some(rate) => println!("Win Rate:       {:.1}%", rate * 100.0),
        None => println!("Win Rate:       n/a"),
    }

    println!();
    println!("--- Categories ---");
    for (category, count) in &report.categories {
        println!("{:<15} {count}", category.as_str());
    }

    if !report.rejections.is_empty() {
        println!();
        println!("--- Rejections ---");
        for (reason, count) in &report.rejections {
            println!("{reason:<24} {count}");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use smc_core::backtest::LabeledSignal;
    use smc_core::domain::{CandidateId, Category, ConfluenceTag, Side, Timeframe, TradeCandidate};

    fn report() -> BacktestReport {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        let candidate = TradeCandidate {
            id: CandidateId::derive("BTC/USDT", Timeframe::M5, Side::Buy, 100.0, created_at),
            symbol: "BTC/USDT".into(),
            timeframe: Timeframe::M5,
            side: Side::Buy,
            entry: 100.0,
            stop_loss: 98.0,
            take_profit: 104.0,
            take_profits: vec![102.0, 104.0, 106.0],
            risk_reward: 2.0,
            confidence: 0.65,
            category: Category::ValidTrade,
            score: 3,
            confluences: vec![ConfluenceTag::BreakOfStructure, ConfluenceTag::OrderBlock],
            reason: "buy: bos+order_block".into(),
            created_at,
        };
        let mut report = BacktestReport {
            windows: 10,
            signals: vec![LabeledSignal {
                candidate,
                outcome: TradeOutcome::Win,
                bars: 4,
            }],
            ..BacktestReport::default()
        };
        report.outcomes.insert(TradeOutcome::Win, 1);
        report.categories.insert(Category::ValidTrade, 1);
        report.categories.insert(Category::Rejected, 9);
        report
    }

    #[test]
    fn signals_csv_has_header_and_rows() {
        let csv = export_signals_csv(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("created_at,symbol,timeframe,side"));
        assert!(lines[1].contains(",5m,buy,100.000000,98.000000,104.000000,"));
        assert!(lines[1].ends_with("win,4,bos+order_block"));
    }

    #[test]
    fn artifacts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&report(), dir.path(), "BTC-USDT_5m").unwrap();
        assert!(run_dir.join("report.json").exists());
        assert!(run_dir.join("signals.csv").exists());

        let json = std::fs::read_to_string(run_dir.join("report.json")).unwrap();
        let back: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report());
    }
}
