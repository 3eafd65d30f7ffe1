use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

use conciliar::{
    load_entries, load_records, ManualOverrideStore, MatchConfig, ReconciliationEngine,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: conciliar <entries.csv> <records.csv> [overrides.json]");
        bail!("missing input files");
    }

    let entries_path = PathBuf::from(&args[1]);
    let records_path = PathBuf::from(&args[2]);
    let overrides_path = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("overrides.json"));

    println!("⚖️  Conciliar - ledger/bank reconciliation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load both sides
    println!("\n📂 Loading input files...");
    let entries = load_entries(&entries_path)?;
    let records = load_records(&records_path)?;
    println!("✓ {} ledger entries from {:?}", entries.len(), entries_path);
    println!("✓ {} bank records from {:?}", records.len(), records_path);

    // 2. Load persisted overrides
    let store = ManualOverrideStore::new(&overrides_path);
    let overrides = store.get_all()?;
    if !overrides.is_empty() {
        println!("✓ {} manual overrides from {:?}", overrides.len(), overrides_path);
    }

    // 3. Run the matching pass
    println!("\n🔍 Matching...");
    let engine = ReconciliationEngine::new(MatchConfig::default());
    let result = engine.reconcile(&entries, &records, &overrides);

    // 4. Report
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {}", result.summary());

    if !result.conflicts.is_empty() {
        println!("\n⚠️  Conflicts needing review:");
        for conflict in result.conflicts.iter().take(10) {
            println!(
                "   {} | {} | {:.2} -> {} candidate(s), {:?}",
                conflict.entry.date,
                conflict.entry.concept,
                conflict.entry.amount,
                conflict.candidates.len(),
                conflict.reason
            );
        }
        if result.conflicts.len() > 10 {
            println!("   ... and {} more", result.conflicts.len() - 10);
        }
    }

    Ok(())
}
