use rand::seq::SliceRandom;
use rand::Rng;

/// Picks the questions shown to a student. Persisted order is kept unless the exam is
/// randomized, in which case the whole set is shuffled and cut to `limit`.
pub(crate) fn select_questions<T, R>(
    mut questions: Vec<T>,
    randomize: bool,
    limit: usize,
    rng: &mut R,
) -> Vec<T>
where
    R: Rng + ?Sized,
{
    if !randomize {
        return questions;
    }

    questions.shuffle(rng);
    questions.truncate(limit);
    questions
}
