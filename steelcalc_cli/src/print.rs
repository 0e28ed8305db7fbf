//! Terminal output for calculation results and stored records.

use steelcalc_core::calculations::{ApparatusOutput, LavalNozzleResult, OxygenLanceResult};
use steelcalc_core::codec::ParameterMap;
use steelcalc_core::record::{CalculationRecord, CalculationStatistics, CalculationType};
use steelcalc_core::repository::ImportReport;

const RULE: &str = "═══════════════════════════════════════";

fn banner(title: &str) {
    println!("{}", RULE);
    println!("  {}", title);
    println!("{}", RULE);
    println!();
}

fn notes(text: &str) {
    println!();
    println!("Notes:");
    for line in text.lines() {
        println!("  - {}", line);
    }
}

pub fn apparatus_output(output: &ApparatusOutput) {
    match output {
        ApparatusOutput::OxygenLance(result) => oxygen_lance(result),
        ApparatusOutput::LavalNozzle(result) => laval_nozzle(result),
    }
}

fn oxygen_lance(result: &OxygenLanceResult) {
    banner("OXYGEN LANCE RESULTS");
    println!("Jet:");
    println!("  Exit velocity:  {:.1} m/s", result.exit_velocity_mps);
    println!("  Speed of sound: {:.1} m/s", result.speed_of_sound_mps);
    println!("  Mach number:    {:.3}", result.mach_number);
    println!("  Jet force:      {:.1} N", result.jet_force_n);
    println!();
    println!("Flow:");
    println!("  Gas density:    {:.2} kg/m³", result.gas_density_kg_m3);
    println!("  Nozzle area:    {:.3e} m²", result.nozzle_area_m2);
    println!("  Reynolds:       {:.0}", result.reynolds_number);
    println!("  Efficiency:     {:.1} %", result.efficiency_pct);
    println!("  Recommended p:  {:.1} MPa", result.recommended_pressure_mpa);
    notes(&result.notes);
}

fn laval_nozzle(result: &LavalNozzleResult) {
    banner("LAVAL NOZZLE RESULTS");
    println!("Throat:");
    println!("  Critical pressure ratio: {:.4}", result.critical_pressure_ratio);
    println!("  Critical temperature:    {:.1} K", result.critical_temperature_k);
    println!("  Critical velocity:       {:.1} m/s", result.critical_velocity_mps);
    println!("  Throat area:             {:.2} mm²", result.throat_area_mm2);
    println!();
    println!("Exit:");
    println!("  Exit area:               {:.2} mm²", result.exit_area_mm2);
    println!("  Exit velocity:           {:.1} m/s", result.exit_velocity_mps);
    println!("  Mach number:             {:.3}", result.mach_number);
    println!("  Thrust:                  {:.1} N", result.thrust_n);
    println!("  Efficiency:              {:.1} %", result.efficiency_pct);
    println!("  Optimal expansion ratio: {:.2}", result.optimal_expansion_ratio);
    notes(&result.notes);
}

fn date_text(record: &CalculationRecord) -> String {
    record
        .calculation_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

pub fn record_table(records: &[CalculationRecord]) {
    if records.is_empty() {
        println!("No calculations found.");
        return;
    }

    println!("{:<6} | {:<30} | {:<13} | {:<19}", "ID", "Title", "Type", "Date");
    println!("{}", "-".repeat(78));
    for record in records {
        println!(
            "{:<6} | {:<30} | {:<13} | {:<19}",
            record.id.unwrap_or_default(),
            truncate(&record.title, 30),
            record.calculation_type.display_name(),
            date_text(record)
        );
    }
    println!();
    println!("{} calculation(s)", records.len());
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

fn parameter_block(title: &str, params: &ParameterMap) {
    println!("{}:", title);
    if params.is_empty() {
        println!("  (none)");
    }
    for (name, value) in params {
        println!("  {:<18} {}", name, value);
    }
}

pub fn record_detail(record: &CalculationRecord) {
    banner(&format!("#{} {}", record.id.unwrap_or_default(), record.title));
    println!("Type:  {}", record.calculation_type.display_name());
    println!("Date:  {}", date_text(record));
    println!();
    parameter_block("Inputs", &record.input_parameters);
    println!();
    parameter_block("Results", &record.output_results);
    if !record.notes.is_empty() {
        notes(&record.notes);
    }
}

pub fn statistics(stats: &CalculationStatistics) {
    banner("CALCULATION STATISTICS");
    println!("Total: {}", stats.total);
    for kind in CalculationType::ALL {
        println!("  {:<14} {}", kind.display_name(), stats.count_for(kind));
    }
    if let (Some(first), Some(last)) = (stats.first_date, stats.last_date) {
        println!();
        println!("First: {}", first.format("%Y-%m-%d %H:%M:%S"));
        println!("Last:  {}", last.format("%Y-%m-%d %H:%M:%S"));
    }
}

pub fn import_report(report: &ImportReport) {
    println!(
        "Imported {} of {} record(s).",
        report.count(),
        report.count() + report.failures.len()
    );
    for failure in &report.failures {
        println!("  element {}: {}", failure.index, failure.error);
    }
}

/// Stored vs recomputed values, one line per name
pub fn parameter_diff(stored: &ParameterMap, fresh: &ParameterMap) {
    println!("{:<18} {:>16} {:>16}", "Result", "Stored", "Recomputed");
    println!("{}", "-".repeat(52));

    let mut names: Vec<&String> = stored.keys().chain(fresh.keys()).collect();
    names.sort();
    names.dedup();

    for name in names {
        let cell = |value: Option<&f64>| value.map(|v| format!("{:.6}", v)).unwrap_or_else(|| "-".to_string());
        let marker = if stored.get(name) == fresh.get(name) { "" } else { "  *" };
        println!(
            "{:<18} {:>16} {:>16}{}",
            name,
            cell(stored.get(name)),
            cell(fresh.get(name)),
            marker
        );
    }
}
