//! Fixed-text recall questions. Only the id is random.

use rand::RngCore;

use crate::model::{ChoiceId, ExplanationStep, Portion, Question, QuestionId, Topic};

pub(super) fn readily_accessible(rng: &mut dyn RngCore) -> Question {
    Question::new(
        QuestionId::generate("def", rng),
        Topic::Definitions,
        Portion::Knowledge,
        "In NEC terms, what does “readily accessible” generally mean?",
        [
            "Accessible only by ladder".into(),
            "Capable of being reached quickly without tools, ladders, or removing obstacles".into(),
            "Behind a locked panel is fine".into(),
            "Only accessible to qualified persons".into(),
        ],
        ChoiceId::B,
        "Reachable quickly without tools/ladders/obstacles",
        vec![ExplanationStep::new(
            "Tip",
            "Definitions are heavily tested — verify in Article 100.",
        )],
        &["Article 100"],
    )
}

pub(super) fn motor_flc_table(rng: &mut dyn RngCore) -> Question {
    Question::new(
        QuestionId::generate("mtrtbl", rng),
        Topic::Motors,
        Portion::Knowledge,
        "A 10 HP, 3-phase, 230V motor: which table is used to find FLC?",
        [
            "Table 430.247".into(),
            "Table 430.248".into(),
            "Table 430.250".into(),
            "Table 430.252".into(),
        ],
        ChoiceId::C,
        "Table 430.250 (three-phase motors)",
        vec![ExplanationStep::new(
            "Check phase",
            "Three-phase motor → Table 430.250",
        )],
        &["430.250"],
    )
}

pub(super) fn single_phase_power(rng: &mut dyn RngCore) -> Question {
    Question::new(
        QuestionId::generate("ct", rng),
        Topic::CalcTheory,
        Portion::Knowledge,
        "Which formula is used to calculate single-phase power (watts) when voltage and current are known?",
        [
            "P = V ÷ I".into(),
            "P = V × I".into(),
            "P = I ÷ V".into(),
            "P = V × R".into(),
        ],
        ChoiceId::B,
        "P = V × I",
        vec![ExplanationStep::new("Rule", "Single-phase watts = volts × amps.")],
        &["Power formulas"],
    )
}
