use rand::{Rng, RngCore};

use exam_core::generators::{self, Generator};
use exam_core::model::{PortionFilter, Question, Topic};

/// Draws tried before giving up on the portion filter.
pub const PICK_ATTEMPTS: usize = 8;

/// Draw a question for `topic`, preferring ones that pass `filter`.
///
/// Each attempt picks a generator uniformly from the topic pool. When no
/// attempt matches, one more unfiltered draw is returned, so the result may
/// belong to the other portion. Every topic pool is non-empty.
pub fn pick(topic: Topic, filter: PortionFilter, rng: &mut dyn RngCore) -> Question {
    pick_nonempty(generators::pool(topic), filter, rng)
}

/// Same as [`pick`] over an explicit pool. `None` only for an empty pool.
pub fn pick_from(
    pool: &[Generator],
    filter: PortionFilter,
    rng: &mut dyn RngCore,
) -> Option<Question> {
    if pool.is_empty() {
        return None;
    }
    Some(pick_nonempty(pool, filter, rng))
}

fn pick_nonempty(pool: &[Generator], filter: PortionFilter, rng: &mut dyn RngCore) -> Question {
    for _ in 0..PICK_ATTEMPTS {
        let question = draw(pool, rng);
        if filter.accepts(question.portion()) {
            return question;
        }
    }
    draw(pool, rng)
}

fn draw(pool: &[Generator], rng: &mut dyn RngCore) -> Question {
    let index = rng.random_range(0..pool.len());
    pool[index].generate(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Portion;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn filtered_draws_match_portion_when_possible() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let q = pick(Topic::Motors, PortionFilter::Calculations, &mut rng);
            assert_eq!(q.topic(), Topic::Motors);
            assert_eq!(q.portion(), Portion::Calculations);

            let q = pick(Topic::Mixed, PortionFilter::Knowledge, &mut rng);
            assert_eq!(q.portion(), Portion::Knowledge);
        }
    }

    #[test]
    fn exhausted_filter_falls_back_to_other_portion() {
        let mut rng = StdRng::seed_from_u64(5);
        let q = pick(Topic::CalcTheory, PortionFilter::Calculations, &mut rng);
        assert_eq!(q.topic(), Topic::CalcTheory);
        assert_eq!(q.portion(), Portion::Knowledge);

        let q = pick(Topic::Special, PortionFilter::Calculations, &mut rng);
        assert_eq!(q.portion(), Portion::Knowledge);
    }

    #[test]
    fn mixed_filter_accepts_first_draw() {
        let mut rng = StdRng::seed_from_u64(8);
        for topic in Topic::ALL {
            assert!(!generators::pool(topic).is_empty(), "{topic}");
            let q = pick(topic, PortionFilter::Mixed, &mut rng);
            assert!(q.validate().is_ok());
            if topic != Topic::Mixed {
                assert_eq!(q.topic(), topic);
            }
        }
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_from(&[], PortionFilter::Mixed, &mut rng).is_none());
    }
}
