//! Roster-membership rules for generated takes
//!
//! These predicates run without any backend. A take survives only if its
//! justification names a rostered player verbatim, that player appears in
//! the take's own text, and the shared context names the player too.
//! Rejected takes are dropped silently; they are not errors.

use super::types::{SharedContext, Take, TeamRoster};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A required field is blank
    MissingField(&'static str),
    /// The justification names nobody on the roster
    NoRosteredPlayer,
    /// The rostered player is absent from the title and body
    PlayerNotInTake(String),
    /// The shared context never names the player
    PlayerNotInContext(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { player: String },
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Verbatim, case-sensitive mention of `player` in `text`
pub fn mentions(text: &str, player: &str) -> bool {
    !player.trim().is_empty() && text.contains(player)
}

/// Roster players named verbatim in `text`, in roster order
pub fn players_named_in<'a>(roster: &'a TeamRoster, text: &str) -> Vec<&'a str> {
    roster
        .players
        .iter()
        .map(String::as_str)
        .filter(|player| mentions(text, player))
        .collect()
}

pub fn review_take(take: &Take, roster: &TeamRoster, context: &SharedContext) -> Verdict {
    for (name, value) in [
        ("title", &take.title),
        ("body", &take.body),
        ("origin_url", &take.origin_url),
        ("justification", &take.justification),
    ] {
        if value.trim().is_empty() {
            return Verdict::Rejected(Rejection::MissingField(name));
        }
    }

    let candidates = players_named_in(roster, &take.justification);
    if candidates.is_empty() {
        return Verdict::Rejected(Rejection::NoRosteredPlayer);
    }

    let in_take: Vec<&str> = candidates
        .into_iter()
        .filter(|player| mentions(&take.title, player) || mentions(&take.body, player))
        .collect();
    let Some(first) = in_take.first() else {
        let named = players_named_in(roster, &take.justification);
        return Verdict::Rejected(Rejection::PlayerNotInTake(named[0].to_string()));
    };

    match in_take
        .iter()
        .find(|player| mentions(context.as_str(), player))
    {
        Some(player) => Verdict::Accepted {
            player: player.to_string(),
        },
        None => Verdict::Rejected(Rejection::PlayerNotInContext(first.to_string())),
    }
}

/// Keep the takes that pass [`review_take`], preserving their order.
pub fn retain_valid(takes: Vec<Take>, roster: &TeamRoster, context: &SharedContext) -> Vec<Take> {
    takes
        .into_iter()
        .filter(|take| match review_take(take, roster, context) {
            Verdict::Accepted { .. } => true,
            Verdict::Rejected(reason) => {
                debug!("Dropping take '{}': {:?}", take.title, reason);
                false
            }
        })
        .collect()
}
