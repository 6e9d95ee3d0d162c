//! Plain-text rendering of a finished (or partly finished) wizard run.

use std::fmt::{self, Write};

use retrofit_core::calculations::{BreakEven, format_euro, format_percent};
use retrofit_core::{BuildingField, CalculatorResult, Contractor, RetrofitOption, Step, WizardState};

const RULE: &str = "────────────────────────────────────────────────────────";

/// Renders every section the wizard has data for.
pub fn render(state: &WizardState) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, state);
    out
}

fn write_report(
    out: &mut String,
    state: &WizardState,
) -> fmt::Result {
    heading(out, Step::Address.title())?;
    writeln!(out, "{}", state.address())?;

    if let Some(building) = state.effective_building() {
        writeln!(out)?;
        heading(out, "Building")?;
        let overrides = state.overrides();
        let rows = [
            (BuildingField::TotalAreaM2, building.total_area_m2().map(|v| v.to_string())),
            (BuildingField::NumUnits, building.num_units().map(|v| v.to_string())),
            (BuildingField::WindowType, building.window_type().map(str::to_string)),
            (BuildingField::RentPerUnit, building.rent_per_unit().map(format_euro)),
            (
                BuildingField::EnergyCostsPerMonth,
                building.energy_costs_per_month().map(format_euro),
            ),
        ];
        for (field, value) in rows {
            let marker = if overrides.display_value(field).is_some() {
                " (edited)"
            } else {
                ""
            };
            writeln!(
                out,
                "  {:<40} {}{}",
                field.label(),
                value.as_deref().unwrap_or("—"),
                marker
            )?;
        }
    }

    if let Some(options) = state.options() {
        writeln!(out)?;
        heading(out, Step::Options.title())?;
        write_options(out, options, state)?;
    }

    if let Some(result) = state.result() {
        writeln!(out)?;
        heading(out, Step::Results.title())?;
        write_result(out, result)?;
    }

    if state.step() == Step::Contractors {
        writeln!(out)?;
        heading(out, Step::Contractors.title())?;
        write_contractors(out, state.contractors(), state.error(Step::Contractors))?;
    }

    Ok(())
}

fn heading(
    out: &mut String,
    title: &str,
) -> fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")
}

fn write_options(
    out: &mut String,
    options: &[RetrofitOption],
    state: &WizardState,
) -> fmt::Result {
    if options.is_empty() {
        return writeln!(out, "  No upgrades available for this building.");
    }
    for option in options {
        let pointer = if state.selected_subtype() == Some(option.subtype) {
            '>'
        } else {
            ' '
        };
        writeln!(
            out,
            "{pointer} {:<24} saves {:>6}   cost {:>14} €   after subsidy {:>14} €",
            option.label,
            format_percent(option.quote.savings_pct),
            format_euro(option.quote.baseline_cost),
            format_euro(option.quote.subsidized_cost),
        )?;
    }
    Ok(())
}

fn write_result(
    out: &mut String,
    result: &CalculatorResult,
) -> fmt::Result {
    let rows = [
        ("Retrofit", result.sub_type_of_retrofit.clone()),
        ("Total cost", format!("{} €", format_euro(result.retrofit_cost_total))),
        (
            "Cost after subsidy",
            format!("{} €", format_euro(result.retrofit_cost_total_after_subsidy)),
        ),
        (
            "Energy savings / month",
            format!("{} €", format_euro(result.energy_savings_per_month)),
        ),
        ("Energy savings", format_percent(result.energy_savings_pct)),
        (
            "Rent increase / unit",
            format!("{} €", format_euro(result.rent_increase_per_unit)),
        ),
        (
            "Tenant savings / unit",
            format!("{} €", format_euro(result.tenant_savings_per_unit)),
        ),
        (
            "Yearly extra income",
            format!("{} €", format_euro(result.yearly_extra_income)),
        ),
        ("Break-even", BreakEven::from_result(result).to_string()),
    ];
    for (label, value) in rows {
        writeln!(out, "  {label:<24} {value}")?;
    }
    Ok(())
}

fn write_contractors(
    out: &mut String,
    contractors: &[Contractor],
    error: Option<&str>,
) -> fmt::Result {
    if let Some(message) = error {
        return writeln!(out, "  {message}");
    }
    if contractors.is_empty() {
        return writeln!(out, "  {}", retrofit_core::wizard::NO_CONTRACTORS_FOUND);
    }
    for contractor in contractors {
        let rating = contractor
            .avg_rating
            .map(|r| format!("★ {}", r.round_dp(1)))
            .unwrap_or_default();
        writeln!(out, "  {:<32} {}", contractor.display_name(), rating)?;
        writeln!(out, "    {}", contractor.badge())?;
    }
    Ok(())
}
