//! The map boundary: one independent work item per roster

use super::types::{SharedContext, TeamRoster, WorkItem};

/// Pure: exactly one [`WorkItem`] per roster, in roster order, each holding
/// the same shared-context instance.
pub fn fan_out(rosters: &[TeamRoster], context: &SharedContext) -> Vec<WorkItem> {
    rosters
        .iter()
        .enumerate()
        .map(|(index, roster)| WorkItem {
            index,
            roster: roster.clone(),
            context: context.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosters(k: usize) -> Vec<TeamRoster> {
        (0..k)
            .map(|i| TeamRoster::new(format!("@m{i}"), vec![format!("Player {i}")]))
            .collect()
    }

    #[test]
    fn test_one_item_per_roster_sharing_context() {
        let context = SharedContext::new("Title: news");
        for k in [0, 1, 10] {
            let rosters = rosters(k);
            let items = fan_out(&rosters, &context);

            assert_eq!(items.len(), k);
            for (i, item) in items.iter().enumerate() {
                assert_eq!(item.index, i);
                assert_eq!(item.roster, rosters[i]);
                assert!(item.context.same_instance(&context));
            }
        }
    }

    #[test]
    fn test_items_are_independent_copies() {
        let context = SharedContext::new("ctx");
        let rosters = rosters(2);
        let mut items = fan_out(&rosters, &context);

        items[0].roster.players.push("Extra".to_string());
        assert_eq!(items[1].roster.players, vec!["Player 1"]);
        assert_eq!(rosters[0].players, vec!["Player 0"]);
    }
}
