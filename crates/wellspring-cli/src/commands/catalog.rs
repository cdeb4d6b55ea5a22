use clap::Subcommand;
use wellspring_core::{Catalog, PatternKind};

use super::format_clock;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List patterns and routines
    List {
        /// Only this kind: breathing, meditation or exercise
        #[arg(long)]
        kind: Option<PatternKind>,
        /// Only this category (e.g. "pain-relief"); "all" matches everything
        #[arg(long)]
        category: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one pattern or routine
    Show {
        /// Pattern or routine id
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::builtin();
    match action {
        CatalogAction::List {
            kind,
            category,
            json,
        } => {
            let category = category.unwrap_or_else(|| "all".to_string());
            let patterns: Vec<_> = catalog
                .by_category(&category)
                .filter(|p| kind.map_or(true, |k| p.kind == k))
                .collect();
            // Routines are exercise sequences; hide them when another kind is asked for.
            let routines: Vec<_> = catalog
                .routines()
                .iter()
                .filter(|_| kind.map_or(true, |k| k == PatternKind::Exercise))
                .filter(|r| category == "all" || r.category == category)
                .collect();

            if json {
                let out = serde_json::json!({
                    "patterns": patterns,
                    "routines": routines,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            for p in &patterns {
                println!(
                    "{:<24} {:<10} {:>6}  {}",
                    p.id,
                    p.kind.as_str(),
                    format_clock(p.total_duration_secs()),
                    p.name
                );
            }
            for r in &routines {
                let secs = catalog
                    .routine_pattern(&r.id)
                    .map(|p| p.total_duration_secs())
                    .unwrap_or(0);
                println!("{:<24} {:<10} {:>6}  {}", r.id, "routine", format_clock(secs), r.name);
            }
        }
        CatalogAction::Show { id, json } => {
            let pattern = catalog.resolve(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pattern)?);
                return Ok(());
            }

            println!("{} ({})", pattern.name, pattern.id);
            println!("  kind:       {}", pattern.kind.as_str());
            println!("  category:   {}", pattern.category);
            println!("  difficulty: {:?}", pattern.difficulty);
            println!("  duration:   {}", format_clock(pattern.total_duration_secs()));
            if !pattern.description.is_empty() {
                println!("  {}", pattern.description);
            }
            println!("  phases ({} cycles):", pattern.cycles);
            for phase in pattern.phases.iter().filter(|p| p.duration_secs > 0) {
                println!(
                    "    {:<20} {:>4}s  {}",
                    phase.name,
                    phase.duration_secs,
                    phase.cue.as_deref().unwrap_or("")
                );
            }
            if !pattern.script.is_empty() {
                println!("  script:");
                for (i, line) in pattern.script.iter().enumerate() {
                    println!("    {:>2}. {line}", i + 1);
                }
            }
            for benefit in &pattern.benefits {
                println!("  + {benefit}");
            }
            for precaution in &pattern.precautions {
                println!("  ! {precaution}");
            }
        }
    }
    Ok(())
}
