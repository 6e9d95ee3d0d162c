//! Scripted in-memory backend shared by the wizard integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use retrofit_core::{
    BackendError, Building, BuildingStub, CalculatorRequest, CalculatorResult, Contractor,
    RetrofitBackend, RetrofitSubtype,
};
use rust_decimal_macros::dec;

#[derive(Debug, Default)]
pub struct CallCounts {
    pub health: AtomicUsize,
    pub list_streets: AtomicUsize,
    pub list_buildings: AtomicUsize,
    pub get_building: AtomicUsize,
    pub run_calculator: AtomicUsize,
    pub list_contractors: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Answers from fixed data. Failure switches and per-postal-code delays
/// let tests steer individual calls.
pub struct ScriptedBackend {
    pub streets: HashMap<String, Vec<String>>,
    pub buildings: Vec<BuildingStub>,
    pub building: Building,
    pub contractors: Vec<Contractor>,
    pub street_delays: HashMap<String, Duration>,
    pub fail_get_building: AtomicBool,
    pub fail_contractors: AtomicBool,
    pub failing_subtypes: Mutex<Vec<RetrofitSubtype>>,
    pub calculator_requests: Mutex<Vec<CalculatorRequest>>,
    pub calls: CallCounts,
}

impl ScriptedBackend {
    /// One single-glazed building at Weserstr. 12, 10317 Berlin.
    pub fn weserstrasse() -> Self {
        let mut streets = HashMap::new();
        streets.insert(
            "10317".to_string(),
            vec!["Weserstr.".to_string(), "Weitlingstr.".to_string()],
        );
        streets.insert("100".to_string(), vec!["Street of 100".to_string()]);
        streets.insert("200".to_string(), vec!["Street of 200".to_string()]);

        Self {
            streets,
            buildings: vec![stub("B-0012", "Weserstr. 12")],
            building: Building {
                building_id: Some("B-0012".to_string()),
                district: Some("Lichtenberg".to_string()),
                postal_code: Some("10317".to_string()),
                street: Some("Weserstr.".to_string()),
                number: Some("12".to_string()),
                city: Some("Berlin".to_string()),
                total_area_m2: Some(dec!(2523)),
                num_units: Some(31),
                window_type: Some("Single Pane".to_string()),
                window_to_floor_ratio: Some(dec!(0.18)),
                rent_per_unit: Some(dec!(856.75)),
                energy_costs_per_month: Some(dec!(1650.5)),
                ..Building::default()
            },
            contractors: vec![Contractor {
                contractor_id: Some("C-1".to_string()),
                company_name: Some("Kiez Fenster GmbH".to_string()),
                specialization: Some("window".to_string()),
                district_served: Some("Lichtenberg".to_string()),
                avg_rating: Some(dec!(4.6)),
                num_reviews: Some(dec!(38)),
            }],
            street_delays: HashMap::new(),
            fail_get_building: AtomicBool::new(false),
            fail_contractors: AtomicBool::new(false),
            failing_subtypes: Mutex::new(Vec::new()),
            calculator_requests: Mutex::new(Vec::new()),
            calls: CallCounts::default(),
        }
    }

    pub fn with_buildings(
        mut self,
        buildings: Vec<BuildingStub>,
    ) -> Self {
        self.buildings = buildings;
        self
    }

    pub fn with_window_type(
        mut self,
        window_type: &str,
    ) -> Self {
        self.building.window_type = Some(window_type.to_string());
        self
    }

    pub fn with_street_delay(
        mut self,
        postal_code: &str,
        delay: Duration,
    ) -> Self {
        self.street_delays.insert(postal_code.to_string(), delay);
        self
    }

    pub fn fail_subtype(
        &self,
        subtype: RetrofitSubtype,
    ) {
        self.failing_subtypes
            .lock()
            .expect("failing_subtypes lock poisoned")
            .push(subtype);
    }

    pub fn calculator_requests(&self) -> Vec<CalculatorRequest> {
        self.calculator_requests
            .lock()
            .expect("calculator_requests lock poisoned")
            .clone()
    }
}

pub fn stub(
    id: &str,
    display: &str,
) -> BuildingStub {
    BuildingStub {
        building_id: id.to_string(),
        display_address: display.to_string(),
    }
}

/// Calculator figures per subtype; triple glazing saves more and costs more.
pub fn quote_for(subtype: RetrofitSubtype) -> CalculatorResult {
    let (pct, total, subsidized, years) = match subtype {
        RetrofitSubtype::DoubleGlazing => (dec!(18), dec!(120000), dec!(78000), dec!(21.5)),
        RetrofitSubtype::TripleGlazing => (dec!(23), dec!(150000), dec!(97500), dec!(26.25)),
    };

    CalculatorResult {
        total_sqm: dec!(2523),
        nr_units: dec!(31),
        window_type: "Single-pane".to_string(),
        energy_costs_per_month: dec!(1650.5),
        rent_per_unit: dec!(856.75),
        sub_type_of_retrofit: subtype.tag().to_string(),
        retrofit_cost_total: total,
        retrofit_cost_total_after_subsidy: subsidized,
        energy_savings_per_month: dec!(300),
        year_until_breakeven: dec!(21.6),
        savings_per_unit: dec!(9.68),
        rent_increase_per_unit: dec!(8),
        tenant_savings_per_unit: dec!(1.68),
        yearly_extra_income: dec!(2976),
        years_until_breakevent_rent_increase: years,
        energy_savings_pct: pct,
        years_until_break_even: None,
        months_until_break_even: None,
    }
}

fn unavailable(body: &str) -> BackendError {
    BackendError::Status {
        status: 503,
        body: body.to_string(),
    }
}

#[async_trait]
impl RetrofitBackend for ScriptedBackend {
    async fn health(&self) -> Result<(), BackendError> {
        self.calls.health.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_streets(
        &self,
        postal_code: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.calls.list_streets.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.street_delays.get(postal_code) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.streets.get(postal_code).cloned().unwrap_or_default())
    }

    async fn list_buildings(
        &self,
        _postal_code: &str,
        _street: &str,
    ) -> Result<Vec<BuildingStub>, BackendError> {
        self.calls.list_buildings.fetch_add(1, Ordering::SeqCst);
        Ok(self.buildings.clone())
    }

    async fn get_building(
        &self,
        building_id: &str,
    ) -> Result<Building, BackendError> {
        self.calls.get_building.fetch_add(1, Ordering::SeqCst);
        if self.fail_get_building.load(Ordering::SeqCst) {
            return Err(unavailable("Building service unavailable"));
        }
        Ok(Building {
            building_id: Some(building_id.to_string()),
            ..self.building.clone()
        })
    }

    async fn run_calculator(
        &self,
        request: &CalculatorRequest,
    ) -> Result<CalculatorResult, BackendError> {
        self.calls.run_calculator.fetch_add(1, Ordering::SeqCst);
        self.calculator_requests
            .lock()
            .expect("calculator_requests lock poisoned")
            .push(request.clone());

        let failing = self
            .failing_subtypes
            .lock()
            .expect("failing_subtypes lock poisoned")
            .contains(&request.subtype);
        if failing {
            return Err(unavailable("Calculator unavailable"));
        }
        Ok(quote_for(request.subtype))
    }

    async fn list_contractors(
        &self,
        _specialization: &str,
    ) -> Result<Vec<Contractor>, BackendError> {
        self.calls.list_contractors.fetch_add(1, Ordering::SeqCst);
        if self.fail_contractors.load(Ordering::SeqCst) {
            return Err(unavailable("Directory unavailable"));
        }
        Ok(self.contractors.clone())
    }
}
