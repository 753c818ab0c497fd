#![deny(warnings)]

//! Headless CLI: builds a small two-division corporation, runs it for a
//! number of cycles, and prints the financial summary. Doubles as a
//! save/load harness for the persistence contract.

use anyhow::{Context, Result};
use chrono::Utc;
use corp_core::{City, IndustryType, Job, MaterialName};
use corp_engine::{Corporation, CycleContext};
use persistence::SaveFile;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    cycles: u32,
    seed: u64,
    save: Option<String>,
    load: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        cycles: 100,
        seed: 42,
        save: None,
        load: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--cycles" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.cycles = v;
                }
            }
            "--seed" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = v;
                }
            }
            "--save" => args.save = it.next(),
            "--load" => args.load = it.next(),
            _ => {}
        }
    }
    args
}

/// An agriculture division feeding a chemical division through a standing
/// plants export, both selling at market.
fn demo_corporation() -> Result<Corporation> {
    let mut corp = Corporation::new("Demo Corp", 200e9);
    corp.create_division("AgroCo", IndustryType::Agriculture)?;
    corp.create_division("ChemCo", IndustryType::Chemical)?;

    for name in ["AgroCo", "ChemCo"] {
        let division = corp.division_mut(name)?;
        let office = division
            .offices
            .get_mut(&City::Sector12)
            .context("default office missing")?;
        office.size = 9;
        office.assign(Job::Operations, 3)?;
        office.assign(Job::Engineer, 2)?;
        office.assign(Job::Business, 1)?;
        office.assign(Job::Management, 2)?;
        office.assign(Job::ResearchDev, 1)?;
    }

    corp.set_material_buy_rate("AgroCo", City::Sector12, MaterialName::Water, 1.0)?;
    corp.set_material_buy_rate("AgroCo", City::Sector12, MaterialName::Chemicals, 0.5)?;
    for material in [MaterialName::Plants, MaterialName::Food] {
        corp.set_material_sell(
            "AgroCo",
            City::Sector12,
            material,
            Some("MAX".to_string()),
            Some("MP".to_string()),
        )?;
    }

    // ChemCo restocks itself: smart supply sizes water purchases, and the
    // plants arrive from AgroCo's surplus.
    corp.set_smart_supply("ChemCo", City::Sector12, true)?;
    corp.add_export(
        "AgroCo",
        City::Sector12,
        MaterialName::Plants,
        "ChemCo",
        City::Sector12,
        "EPROD/2".to_string(),
    )?;
    corp.set_material_sell(
        "ChemCo",
        City::Sector12,
        MaterialName::Chemicals,
        Some("MAX".to_string()),
        Some("MP".to_string()),
    )?;
    Ok(corp)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(cycles = args.cycles, seed = args.seed, "starting");

    let mut ctx = CycleContext::new(args.seed);
    let mut corp = match &args.load {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
            let save = SaveFile::from_bytes(&bytes)?;
            let catch_up = persistence::offline_market_cycles(save.saved_at, Utc::now());
            let mut corp = save.corporation;
            if catch_up > 0 {
                info!(catch_up, "processing offline catch-up batch");
                for _ in corp_engine::CorpState::ALL {
                    corp.process(catch_up, &mut ctx);
                }
            }
            corp
        }
        None => demo_corporation()?,
    };

    for _ in 0..args.cycles {
        for _ in corp_engine::CorpState::ALL {
            corp.process(1, &mut ctx);
        }
        for diagnostic in ctx.drain_diagnostics() {
            warn!(message = %diagnostic.message, "cycle diagnostic");
        }
    }

    let agro = corp.division("AgroCo").ok();
    println!(
        "Corp OK | divisions: {} | funds: ${:.2} | revenue: ${:.2}/s | expenses: ${:.2}/s",
        corp.divisions.len(),
        corp.funds,
        corp.revenue,
        corp.expenses
    );
    if let Some(agro) = agro {
        let wh = &agro.warehouses[&City::Sector12];
        println!(
            "AgroCo | plants: {:.1} (q {:.2}) | exported: {:.2}/s | warehouse: {:.1}/{:.1}",
            wh.material(MaterialName::Plants).stored,
            wh.material(MaterialName::Plants).quality,
            wh.material(MaterialName::Plants).export_rate,
            wh.size_used,
            wh.size
        );
    }

    if let Some(path) = &args.save {
        let save = SaveFile::capture(&corp, Utc::now());
        std::fs::write(path, save.to_bytes()?).with_context(|| format!("writing {path}"))?;
        info!(path = %path, "saved snapshot");
    }

    Ok(())
}
