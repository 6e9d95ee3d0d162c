//! Non-interactive walk through the wizard, driven by command-line input.

use anyhow::{Context, bail};
use tracing::{info, warn};

use retrofit_core::{
    BackendRegistry, BackendStatus, BuildingStub, RetrofitSubtype, Step, WizardController,
};
use retrofit_http::HttpBackendFactory;

/// Registry with every backend this binary can talk to.
pub fn build_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(Box::new(HttpBackendFactory));
    registry
}

/// The answers a user would otherwise type into each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkPlan {
    pub postal_code: String,
    /// Required when the postal code has more than one street.
    pub street: Option<String>,
    /// Required when the street has more than one building.
    pub building_id: Option<String>,
    /// `(field key, value)` pairs applied on the options step.
    pub overrides: Vec<(String, String)>,
    /// Defaults to the first option offered.
    pub option: Option<RetrofitSubtype>,
    pub stop_at: Step,
}

impl WalkPlan {
    pub fn new(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            street: None,
            building_id: None,
            overrides: Vec::new(),
            option: None,
            stop_at: Step::Contractors,
        }
    }
}

/// Runs the wizard from the address step up to `plan.stop_at`.
///
/// Whatever was loaded before a failure stays in the controller's state so
/// the caller can still report it.
pub async fn walk(
    controller: &mut WizardController,
    plan: &WalkPlan,
) -> anyhow::Result<()> {
    if let BackendStatus::Error(message) = controller.check_backend().await {
        bail!("backend is not reachable: {message}");
    }

    let streets = controller
        .set_postal_code(&plan.postal_code)
        .await
        .with_context(|| format!("looking up streets for {}", plan.postal_code))?
        .to_vec();
    let street = choose_street(&plan.postal_code, plan.street.as_deref(), &streets)?;

    let buildings = controller
        .set_street(&street)
        .await
        .with_context(|| format!("looking up buildings on {street}"))?
        .to_vec();
    match &plan.building_id {
        Some(id) => controller.select_building(id)?,
        None if controller.state().address().is_complete() => {}
        None => bail!(
            "{} buildings on {street}; pass --building with one of: {}",
            buildings.len(),
            describe_buildings(&buildings)
        ),
    }
    info!(address = %controller.state().address(), "address resolved");
    if plan.stop_at == Step::Address {
        return Ok(());
    }

    controller
        .go_to_step(Step::Options)
        .await
        .context("loading building details")?;
    for (key, value) in &plan.overrides {
        controller
            .set_override_by_key(key, value)
            .await
            .with_context(|| format!("applying {key}={value}"))?;
    }

    let subtype = match plan.option {
        Some(subtype) => subtype,
        None => controller
            .state()
            .options()
            .and_then(|options| options.first())
            .map(|option| option.subtype)
            .context("no retrofit options are offered for this building")?,
    };
    controller.select_option(subtype)?;
    if plan.stop_at == Step::Options {
        return Ok(());
    }

    controller
        .calculate()
        .await
        .context("running break-even calculation")?;
    controller.go_to_step(Step::Results).await?;
    if plan.stop_at == Step::Results {
        return Ok(());
    }

    controller.go_to_step(Step::Contractors).await?;
    if let Some(message) = controller.state().error(Step::Contractors) {
        warn!(message, "contractor directory unavailable");
    }
    Ok(())
}

fn choose_street(
    postal_code: &str,
    requested: Option<&str>,
    streets: &[String],
) -> anyhow::Result<String> {
    if let Some(requested) = requested {
        return Ok(streets
            .iter()
            .find(|street| street.eq_ignore_ascii_case(requested.trim()))
            .cloned()
            .unwrap_or_else(|| requested.trim().to_string()));
    }
    match streets {
        [] => bail!("no streets found for postal code {postal_code}"),
        [only] => Ok(only.clone()),
        _ => bail!(
            "{} streets in {postal_code}; pass --street with one of: {}",
            streets.len(),
            streets.join(", ")
        ),
    }
}

fn describe_buildings(buildings: &[BuildingStub]) -> String {
    buildings
        .iter()
        .map(|b| format!("{} ({})", b.building_id, b.display_address))
        .collect::<Vec<_>>()
        .join(", ")
}
