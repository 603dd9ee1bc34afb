//! Slack Block Kit payloads for takes

use crate::pipeline::types::Take;
use serde::{Deserialize, Serialize};

pub const HEADER_TEXT: &str = ":fire: :robot_face: Take-Bot is heating up ...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
    Mrkdwn {
        text: String,
    },
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            TextObject::PlainText { text, .. } | TextObject::Mrkdwn { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Divider,
}

impl Block {
    /// Text carried by a header or section; dividers have none
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Header { text } | Block::Section { text } => Some(text.text()),
            Block::Divider => None,
        }
    }
}

/// Body of one webhook POST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

/// Header, then title, body, source and origin sections separated by
/// dividers. There is no trailing divider.
pub fn render_take(take: &Take) -> SlackMessage {
    let header = Block::Header {
        text: TextObject::PlainText {
            text: HEADER_TEXT.to_string(),
            emoji: Some(true),
        },
    };

    let sections = [
        format!("*{}*", take.title),
        take.body.clone(),
        format!("Source: {}", take.source_url),
        format!("Reddit post: {}", take.origin_url),
    ];

    let mut blocks = Vec::with_capacity(1 + sections.len() * 2);
    blocks.push(header);
    for (i, text) in sections.into_iter().enumerate() {
        if i > 0 {
            blocks.push(Block::Divider);
        }
        blocks.push(Block::Section {
            text: TextObject::mrkdwn(text),
        });
    }

    SlackMessage {
        blocks,
        unfurl_links: true,
        unfurl_media: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_take() -> Take {
        Take {
            title: "Ankle Alert".to_string(),
            body: "Hey @X: Player A suffers injury".to_string(),
            source_url: "https://news.example.com/a".to_string(),
            origin_url: "https://redd.it/u2".to_string(),
            justification: "Player A is on the roster".to_string(),
        }
    }

    #[test]
    fn test_layout_header_then_sections_without_trailing_divider() {
        let message = render_take(&sample_take());
        let kinds: Vec<&str> = message
            .blocks
            .iter()
            .map(|b| match b {
                Block::Header { .. } => "header",
                Block::Section { .. } => "section",
                Block::Divider => "divider",
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                "header", "section", "divider", "section", "divider", "section", "divider",
                "section"
            ]
        );
        assert!(message.unfurl_links);
        assert!(message.unfurl_media);
    }

    #[test]
    fn test_section_texts() {
        let message = render_take(&sample_take());
        let texts: Vec<&str> = message
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { text } => Some(text.text()),
                _ => None,
            })
            .collect();

        assert_eq!(
            texts,
            vec![
                "*Ankle Alert*",
                "Hey @X: Player A suffers injury",
                "Source: https://news.example.com/a",
                "Reddit post: https://redd.it/u2",
            ]
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let take = sample_take();
        let first = serde_json::to_vec(&render_take(&take)).unwrap();
        let second = serde_json::to_vec(&render_take(&take)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(render_take(&sample_take())).unwrap();

        assert_eq!(
            value["blocks"][0],
            json!({
                "type": "header",
                "text": {"type": "plain_text", "text": HEADER_TEXT, "emoji": true}
            })
        );
        assert_eq!(
            value["blocks"][1],
            json!({"type": "section", "text": {"type": "mrkdwn", "text": "*Ankle Alert*"}})
        );
        assert_eq!(value["blocks"][2], json!({"type": "divider"}));
        assert_eq!(value["unfurl_links"], true);
        assert_eq!(value["unfurl_media"], true);
    }
}
