//! Numeric generators. Each draws its inputs, computes the answer, and offers
//! three distractors made by perturbing the computation (dropping the 125%,
//! using the wrong factor, and so on).
//!
//! The `*_for` functions take the drawn inputs explicitly so worked examples
//! can be checked without an RNG.

use rand::{Rng, RngCore};

use super::format::{amount, fixed, next_standard_ocpd, round2, va};
use crate::model::{ChoiceId, ExplanationStep, Portion, Question, QuestionId, Topic};

/// 3 VA per square foot (220.12).
pub const LIGHTING_VA_PER_SQ_FT: u32 = 3;
/// Per small-appliance or laundry circuit (220.52).
pub const CIRCUIT_VA: u32 = 1_500;
/// First block of general load taken at 100% (220.42).
pub const DEMAND_FIRST_BLOCK_VA: f64 = 3_000.0;
/// Demand factor applied past the first block.
pub const DEMAND_REMAINDER_FACTOR: f64 = 0.35;
/// Feeder voltages a three-phase question may use.
pub const THREE_PHASE_VOLTAGES: [u32; 3] = [208, 240, 480];

//
// ─── CALCULATIONS ──────────────────────────────────────────────────────────────
//

/// Continuous load sizing: `(required amps at 125%, standard OCPD)`.
#[must_use]
pub fn continuous_ocpd(load_amps: u32) -> (f64, u32) {
    let required = round2(f64::from(load_amps) * 1.25);
    (required, next_standard_ocpd(required))
}

/// Line current of a balanced three-phase load, rounded to 2 decimals.
#[must_use]
pub fn three_phase_current(kva: u32, volts: u32) -> f64 {
    round2(f64::from(kva) * 1_000.0 / (3_f64.sqrt() * f64::from(volts)))
}

/// Breakdown of a dwelling's general lighting + small-appliance + laundry load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellingLoad {
    pub lighting: u32,
    pub small_appliance: u32,
    pub laundry: u32,
}

impl DwellingLoad {
    /// Two small-appliance circuits and one laundry circuit.
    #[must_use]
    pub fn for_area(sq_ft: u32) -> Self {
        Self {
            lighting: sq_ft * LIGHTING_VA_PER_SQ_FT,
            small_appliance: 2 * CIRCUIT_VA,
            laundry: CIRCUIT_VA,
        }
    }

    #[must_use]
    pub fn general(&self) -> u32 {
        self.lighting + self.small_appliance + self.laundry
    }

    /// Load past the first 3,000 VA block.
    #[must_use]
    pub fn remainder(&self) -> f64 {
        (f64::from(self.general()) - DEMAND_FIRST_BLOCK_VA).max(0.0)
    }

    /// General load after the 220.42 demand factors, with `factor` applied to
    /// the remainder.
    #[must_use]
    pub fn demand_with(&self, factor: f64) -> f64 {
        DEMAND_FIRST_BLOCK_VA + self.remainder() * factor
    }

    #[must_use]
    pub fn demand(&self) -> f64 {
        self.demand_with(DEMAND_REMAINDER_FACTOR)
    }
}

//
// ─── GENERATORS ────────────────────────────────────────────────────────────────
//

pub(super) fn pv_source_ampacity(rng: &mut dyn RngCore) -> Question {
    let base = rng.random_range(5..=19_u32);
    pv_source_ampacity_for(base, QuestionId::generate("pv", rng))
}

/// PV source circuit conductors at 125% of maximum current.
#[must_use]
pub fn pv_source_ampacity_for(base: u32, id: QuestionId) -> Question {
    let current = f64::from(base);
    let min = amount(round2(current * 1.25));

    Question::new(
        id,
        Topic::Renewable,
        Portion::Calculations,
        format!(
            "A PV source circuit has a maximum current of {base} A. Per NEC 690, what minimum ampacity must the conductors be sized for?"
        ),
        [
            format!("{base} A"),
            format!("{} A", fixed(current * 1.1, 1)),
            format!("{min} A"),
            format!("{} A", fixed(current * 1.5, 1)),
        ],
        ChoiceId::C,
        format!("{min} A ({base} A × 125%)"),
        vec![
            ExplanationStep::new("Array current", format!("I = {base} A")),
            ExplanationStep::new("Apply 125%", format!("{base} × 1.25 = {min} A")),
        ],
        &["690.8", "690.8(A)(1)"],
    )
}

pub(super) fn dwelling_lighting(rng: &mut dyn RngCore) -> Question {
    let sq_ft = rng.random_range(10..=29_u32) * 100;
    dwelling_lighting_for(sq_ft, QuestionId::generate("dw", rng))
}

/// General lighting load at 3 VA per square foot.
#[must_use]
pub fn dwelling_lighting_for(sq_ft: u32, id: QuestionId) -> Question {
    let load = sq_ft * LIGHTING_VA_PER_SQ_FT;
    let half = amount(f64::from(load) / 2.0);

    Question::new(
        id,
        Topic::Dwelling,
        Portion::Calculations,
        format!(
            "For a dwelling with {sq_ft} sq ft, what is the general lighting load at 3 VA/sq ft?"
        ),
        [
            format!("{sq_ft} VA"),
            format!("{half} VA"),
            format!("{load} VA"),
            format!("{} VA", load + 600),
        ],
        ChoiceId::C,
        format!("{load} VA ({sq_ft} × 3)"),
        vec![
            ExplanationStep::new("Area", format!("{sq_ft} sq ft")),
            ExplanationStep::new("Rule", "3 VA per sq ft"),
            ExplanationStep::new("Compute", format!("{sq_ft} × 3 = {load} VA")),
        ],
        &["220.12"],
    )
}

pub(super) fn service_general_load(rng: &mut dyn RngCore) -> Question {
    let sq_ft = rng.random_range(12..=27_u32) * 100;
    service_general_load_for(sq_ft, QuestionId::generate("svc", rng))
}

/// Dwelling general load before demand factors.
#[must_use]
pub fn service_general_load_for(sq_ft: u32, id: QuestionId) -> Question {
    let load = DwellingLoad::for_area(sq_ft);
    let (lighting, sa, laundry, total) = (
        load.lighting,
        load.small_appliance,
        load.laundry,
        load.general(),
    );

    Question::new(
        id,
        Topic::Services,
        Portion::Calculations,
        format!(
            "A dwelling is {sq_ft} sq ft and has (2) required small-appliance circuits and (1) laundry circuit. What is the minimum general load before demand factors?"
        ),
        [
            format!("{lighting} VA"),
            format!("{} VA", lighting + sa),
            format!("{total} VA"),
            format!("{} VA", total + CIRCUIT_VA),
        ],
        ChoiceId::C,
        format!("{total} VA ({sq_ft}×3 + 2×1500 + 1×1500)"),
        vec![
            ExplanationStep::new(
                "General lighting",
                format!("{sq_ft} × 3 VA = {lighting} VA (220.12)"),
            ),
            ExplanationStep::new("Small appliance", format!("2 × 1500 VA = {sa} VA (220.52(A))")),
            ExplanationStep::new("Laundry", format!("1 × 1500 VA = {laundry} VA (220.52(B))")),
            ExplanationStep::new(
                "Total",
                format!("{lighting} + {sa} + {laundry} = {total} VA"),
            ),
        ],
        &["220.12", "220.52(A)", "220.52(B)"],
    )
}

pub(super) fn dwelling_demand(rng: &mut dyn RngCore) -> Question {
    let sq_ft = rng.random_range(1_200..=2_800_u32);
    dwelling_demand_for(sq_ft, QuestionId::generate("22042", rng))
}

/// 220.42 demand: first 3,000 VA at 100%, remainder at 35%.
#[must_use]
pub fn dwelling_demand_for(sq_ft: u32, id: QuestionId) -> Question {
    let load = DwellingLoad::for_area(sq_ft);
    let general = f64::from(load.general());
    let demand = load.demand();

    Question::new(
        id,
        Topic::Services,
        Portion::Calculations,
        format!(
            "A dwelling is {sq_ft} sq ft with (2) small-appliance circuits and (1) laundry circuit. What is the demand load for general lighting + SA + laundry using 220.42?"
        ),
        [
            va(general),
            va(demand),
            va(load.demand_with(0.4)),
            va(load.demand_with(0.25)),
        ],
        ChoiceId::B,
        format!("{} (first 3,000 VA at 100% + remainder at 35%)", va(demand)),
        vec![
            ExplanationStep::new(
                "General lighting",
                format!("{sq_ft} × 3 = {} (220.12)", va(f64::from(load.lighting))),
            ),
            ExplanationStep::new(
                "SA + laundry",
                format!(
                    "2×1500 + 1×1500 = {} (220.52)",
                    va(f64::from(load.small_appliance + load.laundry))
                ),
            ),
            ExplanationStep::new("Total general", va(general)),
            ExplanationStep::new(
                "220.42 demand",
                format!(
                    "3,000 VA + ({} × 35%) = {}",
                    va(load.remainder()),
                    va(demand)
                ),
            ),
        ],
        &["220.12", "220.52(A)", "220.52(B)", "220.42"],
    )
}

pub(super) fn feeder_three_phase(rng: &mut dyn RngCore) -> Question {
    let kva = rng.random_range(15..=75_u32);
    let volts = THREE_PHASE_VOLTAGES[rng.random_range(0..THREE_PHASE_VOLTAGES.len())];
    feeder_three_phase_for(kva, volts, QuestionId::generate("fd3ph", rng))
}

/// Three-phase feeder line current from kVA.
#[must_use]
pub fn feeder_three_phase_for(kva: u32, volts: u32, id: QuestionId) -> Question {
    let amps = three_phase_current(kva, volts);
    let watts = f64::from(kva) * 1_000.0;
    let v = f64::from(volts);
    let shown = amount(amps);

    Question::new(
        id,
        Topic::Feeders,
        Portion::Calculations,
        format!("A 3φ feeder supplies a {kva} kVA load at {volts}V. What is the line current?"),
        [
            format!("{} A", amount(round2(watts / v))),
            format!("{shown} A"),
            format!("{} A", amount(round2(amps * 1.25))),
            format!("{} A", amount(round2(watts / (2.0 * v)))),
        ],
        ChoiceId::B,
        format!("{shown} A (I = kVA×1000 ÷ (√3×V))"),
        vec![
            ExplanationStep::new("Formula", "I = (kVA × 1000) ÷ (√3 × V)"),
            ExplanationStep::new(
                "Compute",
                format!("{kva}×1000 ÷ (1.732×{volts}) = {shown} A"),
            ),
        ],
        &["3φ power formulas"],
    )
}

pub(super) fn continuous_load_ocpd(rng: &mut dyn RngCore) -> Question {
    let load = rng.random_range(8..=23_u32);
    continuous_load_ocpd_for(load, QuestionId::generate("ocpd", rng))
}

/// Minimum standard OCPD for a continuous load.
#[must_use]
pub fn continuous_load_ocpd_for(load_amps: u32, id: QuestionId) -> Question {
    let (required, breaker) = continuous_ocpd(load_amps);
    let shown = amount(required);

    Question::new(
        id,
        Topic::Branch,
        Portion::Calculations,
        format!(
            "A continuous load is {load_amps} A. What is the minimum standard OCPD size required?"
        ),
        [
            format!("{load_amps} A"),
            format!("{} A", amount(required.ceil())),
            format!("{breaker} A"),
            format!("{} A", next_standard_ocpd(required * 1.2)),
        ],
        ChoiceId::C,
        format!("{breaker} A (125% = {shown} A, then next standard size)"),
        vec![
            ExplanationStep::new("Continuous rule", format!("{load_amps} × 125% = {shown} A")),
            ExplanationStep::new(
                "Standard size",
                format!("Next standard OCPD size ≥ {shown} A is {breaker} A (240.6)"),
            ),
        ],
        &["210.20(A)", "215.3", "230.42(A)(1)", "240.6"],
    )
}

pub(super) fn motor_conductors(rng: &mut dyn RngCore) -> Question {
    let flc = rng.random_range(12..=42_u32);
    motor_conductors_for(flc, QuestionId::generate("mtr", rng))
}

/// Motor branch-circuit conductors at 125% of FLC.
#[must_use]
pub fn motor_conductors_for(flc: u32, id: QuestionId) -> Question {
    let current = f64::from(flc);
    let min = amount(round2(current * 1.25));

    Question::new(
        id,
        Topic::Motors,
        Portion::Calculations,
        format!(
            "A motor has an FLC of {flc} A. What minimum ampacity must the branch-circuit conductors be sized for?"
        ),
        [
            format!("{flc} A"),
            format!("{} A", fixed(current * 1.15, 2)),
            format!("{min} A"),
            format!("{} A", fixed(current * 1.5, 2)),
        ],
        ChoiceId::C,
        format!("{min} A ({flc} × 125%)"),
        vec![
            ExplanationStep::new("Rule", "Motor conductors ≥ 125% of FLC"),
            ExplanationStep::new("Compute", format!("{flc} × 1.25 = {min} A")),
        ],
        &["430.22"],
    )
}
