//! Question generators and the per-topic pools they are dispatched from.
//!
//! A generator is a plain function of an RNG. It cannot fail: every input it
//! uses is drawn by itself.

mod calculations;
pub mod format;
mod knowledge;

use rand::RngCore;
use std::fmt;

use crate::model::{Portion, Question, Topic};

pub use calculations::{
    DwellingLoad, continuous_load_ocpd_for, continuous_ocpd, dwelling_demand_for,
    dwelling_lighting_for, feeder_three_phase_for, motor_conductors_for, pv_source_ampacity_for,
    service_general_load_for, three_phase_current,
};

pub type GenerateFn = fn(&mut dyn RngCore) -> Question;

/// A named question generator with the topic and portion it produces.
#[derive(Clone, Copy)]
pub struct Generator {
    name: &'static str,
    topic: Topic,
    portion: Portion,
    generate: GenerateFn,
}

impl Generator {
    #[must_use]
    pub const fn new(
        name: &'static str,
        topic: Topic,
        portion: Portion,
        generate: GenerateFn,
    ) -> Self {
        Self {
            name,
            topic,
            portion,
            generate,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn portion(&self) -> Portion {
        self.portion
    }

    #[must_use]
    pub fn generate(&self, rng: &mut dyn RngCore) -> Question {
        (self.generate)(rng)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("name", &self.name)
            .field("topic", &self.topic)
            .field("portion", &self.portion)
            .finish_non_exhaustive()
    }
}

pub const PV_SOURCE_AMPACITY: Generator = Generator::new(
    "pv_source_ampacity",
    Topic::Renewable,
    Portion::Calculations,
    calculations::pv_source_ampacity,
);

pub const DWELLING_LIGHTING: Generator = Generator::new(
    "dwelling_lighting",
    Topic::Dwelling,
    Portion::Calculations,
    calculations::dwelling_lighting,
);

pub const SERVICE_GENERAL_LOAD: Generator = Generator::new(
    "service_general_load",
    Topic::Services,
    Portion::Calculations,
    calculations::service_general_load,
);

pub const DWELLING_DEMAND: Generator = Generator::new(
    "dwelling_demand_220_42",
    Topic::Services,
    Portion::Calculations,
    calculations::dwelling_demand,
);

pub const FEEDER_THREE_PHASE: Generator = Generator::new(
    "feeder_three_phase",
    Topic::Feeders,
    Portion::Calculations,
    calculations::feeder_three_phase,
);

pub const CONTINUOUS_LOAD_OCPD: Generator = Generator::new(
    "continuous_load_ocpd",
    Topic::Branch,
    Portion::Calculations,
    calculations::continuous_load_ocpd,
);

pub const MOTOR_CONDUCTORS: Generator = Generator::new(
    "motor_conductors",
    Topic::Motors,
    Portion::Calculations,
    calculations::motor_conductors,
);

pub const READILY_ACCESSIBLE: Generator = Generator::new(
    "readily_accessible",
    Topic::Definitions,
    Portion::Knowledge,
    knowledge::readily_accessible,
);

pub const MOTOR_FLC_TABLE: Generator = Generator::new(
    "motor_flc_table",
    Topic::Motors,
    Portion::Knowledge,
    knowledge::motor_flc_table,
);

pub const SINGLE_PHASE_POWER: Generator = Generator::new(
    "single_phase_power",
    Topic::CalcTheory,
    Portion::Knowledge,
    knowledge::single_phase_power,
);

/// Every generator; this is the `mixed` pool.
pub const ALL: &[Generator] = &[
    SERVICE_GENERAL_LOAD,
    DWELLING_DEMAND,
    FEEDER_THREE_PHASE,
    CONTINUOUS_LOAD_OCPD,
    MOTOR_CONDUCTORS,
    DWELLING_LIGHTING,
    PV_SOURCE_AMPACITY,
    READILY_ACCESSIBLE,
    MOTOR_FLC_TABLE,
    SINGLE_PHASE_POWER,
];

/// Generators a topic draws from. Topics without dedicated content borrow a
/// related generator (wiring uses OCPD sizing, equipment/controls/special use
/// the definitions question).
#[must_use]
pub fn pool(topic: Topic) -> &'static [Generator] {
    match topic {
        Topic::Mixed => ALL,
        Topic::Definitions | Topic::Equipment | Topic::Controls | Topic::Special => {
            &[READILY_ACCESSIBLE]
        }
        Topic::CalcTheory => &[SINGLE_PHASE_POWER],
        Topic::Services => &[SERVICE_GENERAL_LOAD, DWELLING_DEMAND],
        Topic::Feeders => &[FEEDER_THREE_PHASE],
        Topic::Branch | Topic::Wiring => &[CONTINUOUS_LOAD_OCPD],
        Topic::Motors => &[MOTOR_FLC_TABLE, MOTOR_CONDUCTORS],
        Topic::Renewable => &[PV_SOURCE_AMPACITY],
        Topic::Dwelling => &[DWELLING_LIGHTING],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn every_generator_upholds_question_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        for generator in ALL {
            for _ in 0..200 {
                let q = generator.generate(&mut rng);
                assert_eq!(q.validate(), Ok(()), "{}", generator.name());
                assert_eq!(q.choices().len(), 4);
                assert_eq!(
                    q.choices()
                        .iter()
                        .filter(|c| c.id == q.correct_choice_id())
                        .count(),
                    1
                );
                assert!(!q.steps().is_empty());
                assert!(!q.refs().is_empty());
                assert_eq!(q.topic(), generator.topic());
                assert_eq!(q.portion(), generator.portion());
            }
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(9);
        let ids: HashSet<_> = (0..500)
            .map(|i| ALL[i % ALL.len()].generate(&mut rng).id().clone())
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn generated_inputs_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..300 {
            let q = CONTINUOUS_LOAD_OCPD.generate(&mut rng);
            let load: u32 = q.choices()[0]
                .text
                .trim_end_matches(" A")
                .parse()
                .unwrap();
            assert!((8..=23).contains(&load));

            let q = DWELLING_LIGHTING.generate(&mut rng);
            let sq_ft: u32 = q.choices()[0]
                .text
                .trim_end_matches(" VA")
                .parse()
                .unwrap();
            assert!((1_000..=2_900).contains(&sq_ft));
            assert_eq!(sq_ft % 100, 0);
        }
    }

    #[test]
    fn pools_cover_every_topic_and_match_topics() {
        for topic in Topic::ALL {
            let pool = pool(topic);
            assert!(!pool.is_empty(), "{topic}");
        }
        assert_eq!(pool(Topic::Mixed).len(), 10);
        assert!(pool(Topic::Services).iter().all(|g| g.topic() == Topic::Services));
        assert_eq!(pool(Topic::Wiring)[0].name(), "continuous_load_ocpd");
    }
}
