use crate::analysis::default_registry;
use crate::errors::AppResult;
use clap::Args;

/// List every registered boss with its encounter
#[derive(Args)]
pub struct ListBossesCommand {}

impl ListBossesCommand {
    pub fn run(&self) -> AppResult<()> {
        let registry = default_registry()?;
        println!("Registered bosses:");
        for key in registry.keys() {
            let boss = registry.create(key)?;
            println!(
                "  {:<30} {} (encounter {}, {} analyses, {} plots)",
                key,
                boss.name,
                boss.encounter_id,
                boss.analyses.len(),
                boss.plots.len()
            );
        }
        Ok(())
    }
}
