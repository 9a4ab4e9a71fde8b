//! Poll resolution.
//!
//! The winner of a poll is the option with the most votes. Ties go to the
//! option listed first, so with no votes cast the first option wins.

use crate::event::{OptionId, Tally};

/// Anything that can be voted on.
pub trait PollOption {
    fn option_id(&self) -> OptionId;
}

/// Resolve the winning option, or `None` if there are no options.
///
/// Votes for ids that are not in `options` are ignored.
pub fn resolve_winner<'a, T: PollOption>(options: &'a [T], votes: &Tally) -> Option<&'a T> {
    let count = |option: &T| votes.get(&option.option_id()).copied().unwrap_or(0);
    let max_count = options.iter().map(count).max()?;
    options.iter().find(|option| count(*option) == max_count)
}

/// One row of a poll's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTally<'a, T> {
    pub option: &'a T,
    pub count: u64,
    pub winner: bool,
}

/// Per-option counts in list order, with the winner flagged.
pub fn poll_summary<'a, T: PollOption>(options: &'a [T], votes: &Tally) -> Vec<PollTally<'a, T>> {
    let winner_id = resolve_winner(options, votes).map(|winner| winner.option_id());

    options
        .iter()
        .map(|option| {
            let id = option.option_id();
            PollTally {
                option,
                count: votes.get(&id).copied().unwrap_or(0),
                // Ids are unique within an event, so the first match is the winner
                winner: Some(id) == winner_id,
            }
        })
        .collect()
}
