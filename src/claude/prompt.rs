//! Prompts for the two generation phases
//!
//! Both phases use the same rules: the manager's roster is the sole
//! authority, and a take is only allowed for a player named explicitly in
//! the supplied text. Templates are rendered with tera; substituted values
//! are inserted verbatim.

use super::{CompletionRequest, OutputSchema};
use crate::error::{Error, Result};
use serde_json::json;
use tera::{Context, Tera};

const DRAFT_TEMPLATE: &str = "draft_system";
const REVIEW_TEMPLATE: &str = "review_system";

/// Tool name the structured phase must call
pub const TAKE_TOOL_NAME: &str = "record_takes";

const DRAFT_SYSTEM: &str = r#"Your job is to generate fun, punchy takes for a Fantasy Football manager about the players on his / her team.

Carefully review and memorize the list of players on the manager's team provided by the manager at the end of these instructions.

This list of players is definitive and should be used as the sole reference for the manager's team composition.

Examine the recent news and events in the world of the NFL provided below.

For each news item, systematically cross-reference it against the memorized list of the manager's players.

IMPORTANT: Only generate takes for players who are EXPLICITLY and DIRECTLY mentioned by name in the news items. Do not infer, extrapolate, or generate takes based on indirect implications or general trends that might affect a player.

If and only if a news item specifically mentions a player by name, and that player is on the manager's team, generate a take about that player.

Each take should be player-specific and based solely on the provided news. Do not include speculation or information from outside the given news items.

Create a numbered list of takes and format each take as follows:

Include a concise and fun subject line
Start with "Hey {{ manager }}:" and then provide a brief summary of the news, focusing only on what is directly stated about the player
Include the exact Source URL of the news item, if provided
Include the exact Reddit post URL of the news item
Provide your reasoning for the take, which confirms that the specific player is on the roster of the Fantasy Manager

After generating each take, double-check that the player mentioned is indeed on the manager's team by referring back to the original list.

If no news items directly mention any players on the manager's team by name, explicitly state that no relevant news was found for the team's players.

Before finalizing your response, review all generated takes and confirm once more that each mentioned player is on the manager's team as listed at the beginning of the prompt and is explicitly named in the news item.

If a player is not directly named in the news or you're unsure about whether a player is on the team, do not generate a take for that player.

Here are the recent news and events in the world of the NFL to base your takes on: {{ context }}"#;

const DRAFT_USER: &str = "Only generate takes if any of these players are EXPLICITLY and DIRECTLY in the news. Here are the players: ";

const REVIEW_SYSTEM: &str = r#"Your job is to review and then format a final list of fun, punchy takes for a Fantasy Football manager about the players on his / her team.

Review Phase:
1. First, check if any takes are provided in the list of takes. If the list of takes is empty or contains no takes, record an empty list of takes and end the process.

2. If there are takes provided, then carefully review and memorize the list of players on the manager's team provided at the end of these instructions. This list is definitive and should be used as the sole reference for the manager's team composition.

3. For each take in the list of takes, verify that:
   a) The player mentioned is EXPLICITLY and DIRECTLY named in the take.
   b) The player is on the manager's team (as per the provided list).
   c) The take is based solely on the information provided within the list of takes.

4. Discard any takes that do not meet ALL of the above criteria.

Here is the list of takes to review:

{{ draft }}

---

Formatting Phase:
If any takes remain after the review phase, format each take as follows:

1. title: a concise and fun subject line
2. body: start with "Hey {{ manager }}:" and then provide a brief summary of the news, focusing only on what is directly stated about the player
3. source_url: the exact Source URL of the news item, if provided
4. origin_url: the exact Reddit post URL of the news item
5. justification: your reasoning for the take, naming the player exactly as written in the roster and confirming that the player is on the roster of the Fantasy Manager

Final Check:

Before finalizing your response, review ALL formatted takes once more to ensure they meet all criteria.

Ensure that the body of EACH formatted take starts with "Hey {{ manager }}:".

If no takes remain after the review process, record an empty list of takes."#;

const REVIEW_USER: &str = "Only generate your final, formatted takes if any of these players are EXPLICITLY and DIRECTLY in the provided list of takes. Here are the players: ";

/// Renders the draft and review prompts
pub struct PromptEngine {
    tera: Tera,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            (DRAFT_TEMPLATE, DRAFT_SYSTEM),
            (REVIEW_TEMPLATE, REVIEW_SYSTEM),
        ])
        .map_err(Error::Template)?;
        Ok(Self { tera })
    }

    /// Phase 1 prompt: roster, shared context, take format
    pub fn draft_request(
        &self,
        manager: &str,
        context: &str,
        player_list: &str,
    ) -> Result<CompletionRequest> {
        let mut vars = Context::new();
        vars.insert("manager", manager);
        vars.insert("context", context);
        let system = self.tera.render(DRAFT_TEMPLATE, &vars)?;
        Ok(CompletionRequest::new(
            system,
            format!("{DRAFT_USER}{player_list}"),
        ))
    }

    /// Phase 2 prompt: re-validate and structure the phase 1 draft
    pub fn review_request(
        &self,
        manager: &str,
        draft: &str,
        player_list: &str,
    ) -> Result<CompletionRequest> {
        let mut vars = Context::new();
        vars.insert("manager", manager);
        vars.insert("draft", draft);
        let system = self.tera.render(REVIEW_TEMPLATE, &vars)?;
        Ok(CompletionRequest::new(
            system,
            format!("{REVIEW_USER}{player_list}"),
        ))
    }
}

/// Schema for the structured phase: `{ "takes": [Take, ...] }`
pub fn take_list_schema() -> OutputSchema {
    OutputSchema {
        name: TAKE_TOOL_NAME.to_string(),
        description: "Record the final list of reviewed takes. Use an empty list when no take survives review.".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "takes": {
                    "type": "array",
                    "description": "A list of takes, each containing a title and a take observation.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "Punchy summary title for the take"
                            },
                            "body": {
                                "type": "string",
                                "description": "Fun, punchy observation about a specific player"
                            },
                            "source_url": {
                                "type": "string",
                                "description": "Source data URL for information in the take (if applicable)"
                            },
                            "origin_url": {
                                "type": "string",
                                "description": "Reddit post URL for the post"
                            },
                            "justification": {
                                "type": "string",
                                "description": "Reasoning for the take, which names the player and confirms that the player is on the roster of the Fantasy Manager"
                            }
                        },
                        "required": ["title", "body", "source_url", "origin_url", "justification"]
                    }
                }
            },
            "required": ["takes"]
        }),
    }
}
