// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;

use disclosure_watch::{
    export, find_person, format_change, format_compact, format_money, logging, rank, search, Bucket, Config,
    DataSources, Population, RuleEngine,
};

fn main() -> Result<()> {
    logging::init();
    let config = Config::from_env();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("rank") => run_rank(&config, &args[1..]),
        Some("show") => run_show(&config, &args[1..]),
        Some("export") => run_export(&config, &args[1..]),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        // UI mode (default)
        _ => run_ui_mode(config),
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  watchdog                                   interactive ranking (TUI)");
    println!("  watchdog rank [assembly|government] [query]");
    println!("  watchdog show <name> [assembly|government]");
    println!("  watchdog export <file.csv> [assembly|government]");
}

/// Split an optional leading population word off the argument list
fn population_arg(args: &[String]) -> (Population, &[String]) {
    match args.first().and_then(|a| Population::parse(a)) {
        Some(population) => (population, &args[1..]),
        None => (Population::Assembly, args),
    }
}

fn load(config: &Config) -> Result<(DataSources, RuleEngine)> {
    let sources = DataSources::load(config);
    let engine = config.rule_engine()?;
    Ok((sources, engine))
}

fn run_rank(config: &Config, args: &[String]) -> Result<()> {
    let (population, rest) = population_arg(args);
    let query = rest.join(" ");
    let (sources, engine) = load(config)?;

    let ranked = rank(population, &sources, &engine);
    let hits = search(&ranked, &query);

    println!("📊 {} 재산 순위 ({}명)", population.title(), hits.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for member in hits {
        let s = &member.summary;
        println!(
            "{:>4}위  {}  {} · {}  {}  {}",
            member.rank,
            s.name,
            s.affiliation_label,
            s.secondary_label,
            format_money(s.breakdown.net_worth),
            format_change(&s.breakdown)
        );
    }

    Ok(())
}

fn run_show(config: &Config, args: &[String]) -> Result<()> {
    let Some(name) = args.first() else {
        print_usage();
        return Ok(());
    };
    let hint = args.get(1).and_then(|a| Population::parse(a));
    let (sources, engine) = load(config)?;

    let Some(summary) = find_person(name, hint, &sources, &engine) else {
        println!("정보 없음: {}", name);
        return Ok(());
    };

    let b = &summary.breakdown;
    println!("{}  [{}]  {}", summary.name, summary.affiliation_label, summary.secondary_label);
    println!("순자산 {}   전년 대비 {}", format_money(b.net_worth), format_change(b));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for bucket in Bucket::ALL {
        let items = b.items(bucket);
        if items.is_empty() {
            continue;
        }
        let sign = if bucket.is_debt() { "-" } else { "" };
        println!(
            "\n{} ({}건)  {}{}  [{}{}]",
            bucket.title(),
            items.len(),
            sign,
            format_money(b.total(bucket)),
            sign,
            format_compact(b.total(bucket))
        );
        for item in items {
            let reason = item.display_reason().map(|r| format!("  ({})", r)).unwrap_or_default();
            println!(
                "  [{}] {} {}  {}{}{}",
                item.relationship,
                item.item_type,
                item.description,
                sign,
                format_money(item.current_value),
                reason
            );
        }
    }

    Ok(())
}

fn run_export(config: &Config, args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        print_usage();
        return Ok(());
    };
    let (population, _) = population_arg(&args[1..]);
    let (sources, engine) = load(config)?;

    let ranked = rank(population, &sources, &engine);
    export::export_csv(path, &ranked)?;
    println!("✓ Exported {} {} rows to {}", ranked.len(), population, path);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: Config) -> Result<()> {
    let (sources, engine) = load(&config)?;
    if sources.is_empty() {
        eprintln!("❌ No disclosure data found in {:?}", config.data_dir);
        eprintln!("   Set WATCHDOG_DATA_DIR to the directory holding assembly_assets.json");
        std::process::exit(1);
    }

    let mut app = ui::App::new(config, sources, engine);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: watchdog rank | show <name> | export <file.csv>");
    std::process::exit(1);
}
