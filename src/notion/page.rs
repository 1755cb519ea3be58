//! Pure builders for the JSON bodies sent to Notion.
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::model::{Attachment, Item, Label};

/// Notion rejects a single rich text object longer than this.
pub const RICH_TEXT_LIMIT: usize = 2000;

pub const TITLE_PROPERTY: &str = "Name";
pub const DESCRIPTION_PROPERTY: &str = "Description";
pub const PRIMARY_LINK_PROPERTY: &str = "Primary Link";
pub const LABELS_PROPERTY: &str = "Labels";
pub const LAST_UPDATED_PROPERTY: &str = "Last Updated";

/// Split `content` into consecutive pieces of at most `limit` characters.
/// Empty input yields a single empty piece.
pub fn split_text(content: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0, "segment limit must be positive");
    if content.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = content.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

/// Rich text array for `content`, optionally linking every segment to `link`.
pub fn rich_text(content: &str, link: Option<&str>) -> Value {
    let segments: Vec<Value> = split_text(content, RICH_TEXT_LIMIT)
        .into_iter()
        .map(|segment| match link {
            Some(url) => json!({ "type": "text", "text": { "content": segment, "link": { "url": url } } }),
            None => json!({ "type": "text", "text": { "content": segment } }),
        })
        .collect();
    Value::Array(segments)
}

pub fn heading(title: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_1",
        "heading_1": { "rich_text": rich_text(title, None) }
    })
}

pub fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(text, None) }
    })
}

pub fn link_item(name: &str, url: &str) -> Value {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": rich_text(name, Some(url)) }
    })
}

/// Attachments keyed by display name, kept in first-insertion order. A
/// repeated name keeps its position and takes the later URL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttachmentLinks {
    entries: Vec<(String, String)>,
}

impl AttachmentLinks {
    pub fn insert(&mut self, name: &str, url: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = url.to_string(),
            None => self.entries.push((name.to_string(), url.to_string())),
        }
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries.first().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split attachments into (uploaded files, external URLs).
pub fn partition_attachments(attachments: &[Attachment]) -> (AttachmentLinks, AttachmentLinks) {
    let mut files = AttachmentLinks::default();
    let mut urls = AttachmentLinks::default();
    for attachment in attachments {
        let target = if attachment.is_upload { &mut files } else { &mut urls };
        target.insert(&attachment.name, &attachment.url);
    }
    (files, urls)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOption {
    pub name: String,
    pub color: String,
}

/// Color-only Trello labels have an empty name; Notion has no use for them.
fn named(label: &&Label) -> bool {
    !label.name.trim().is_empty()
}

/// One select option per distinct label name across `items`. The last label
/// seen for a name decides its color, translated through `colors` when the
/// Trello color has an alias. Unnamed labels are skipped.
pub fn collect_label_options(items: &[Item], colors: &BTreeMap<String, String>) -> Vec<LabelOption> {
    let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();
    for label in items.iter().flat_map(|item| &item.labels).filter(named) {
        let color = colors.get(&label.color).unwrap_or(&label.color);
        by_name.insert(&label.name, color);
    }
    by_name
        .into_iter()
        .map(|(name, color)| LabelOption {
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// Property definitions pushed onto every target database before import.
pub fn schema_properties(labels: &[LabelOption]) -> Value {
    let options: Vec<Value> = labels
        .iter()
        .map(|l| json!({ "name": l.name, "color": l.color }))
        .collect();
    json!({
        DESCRIPTION_PROPERTY: { "rich_text": {} },
        PRIMARY_LINK_PROPERTY: { "url": {} },
        LABELS_PROPERTY: { "multi_select": { "options": options } },
        LAST_UPDATED_PROPERTY: { "date": {} },
    })
}

/// Full create-page body for `item` in `database_id`.
///
/// With a `description_limit` the description property is cut to that many
/// characters and the complete text is appended as a final section.
pub fn build_page_request(database_id: &str, item: &Item, description_limit: Option<usize>) -> Value {
    let (files, urls) = partition_attachments(&item.attachments);

    let mut properties = Map::new();
    properties.insert(
        TITLE_PROPERTY.to_string(),
        json!({ "title": rich_text(&item.name, None) }),
    );

    let description: String = match description_limit {
        Some(limit) => item.description.chars().take(limit).collect(),
        None => item.description.clone(),
    };
    properties.insert(
        DESCRIPTION_PROPERTY.to_string(),
        json!({ "rich_text": rich_text(&description, None) }),
    );

    if let Some((_, url)) = urls.first() {
        properties.insert(PRIMARY_LINK_PROPERTY.to_string(), json!({ "url": url }));
    }

    if let Some(modified) = item.last_modified {
        properties.insert(
            LAST_UPDATED_PROPERTY.to_string(),
            json!({ "date": { "start": modified.to_rfc3339() } }),
        );
    }

    let options: Vec<Value> = item
        .labels
        .iter()
        .filter(named)
        .map(|l| json!({ "name": l.name }))
        .collect();
    if !options.is_empty() {
        properties.insert(
            LABELS_PROPERTY.to_string(),
            json!({ "multi_select": options }),
        );
    }

    let mut children = vec![heading("File Attachments")];
    children.extend(files.iter().map(|(name, url)| link_item(name, url)));
    children.push(heading("URL Attachments"));
    children.extend(urls.iter().map(|(name, url)| link_item(name, url)));
    children.push(heading("Comments"));
    children.extend(item.comments.iter().map(|c| paragraph(c)));
    if description_limit.is_some() {
        children.push(heading("Description"));
        children.push(paragraph(&item.description));
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(properties),
        "children": children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn attachment(is_upload: bool, name: &str, url: &str) -> Attachment {
        Attachment {
            is_upload,
            name: name.into(),
            url: url.into(),
            file_name: None,
        }
    }

    fn sample_item() -> Item {
        let mut item = Item::new("c1", "Learn Rust", "To Read");
        item.description = "a".repeat(150);
        item.labels = vec![Label {
            name: "lang".into(),
            color: "sky".into(),
        }];
        item.last_modified = Some(Utc.with_ymd_and_hms(2021, 8, 19, 7, 8, 1).unwrap());
        item.comments = vec!["great".into(), "again".into()];
        item.attachments = vec![
            attachment(true, "notes.pdf", "https://trello/notes.pdf"),
            attachment(false, "book", "https://doc.rust-lang.org/book"),
            attachment(false, "rbe", "https://doc.rust-lang.org/rust-by-example"),
        ];
        item
    }

    fn block_types(body: &Value) -> Vec<String> {
        body["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["type"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn split_text_4500_into_three_segments() {
        let content: String = ('a'..='z').cycle().take(4500).collect();
        let segments = split_text(&content, RICH_TEXT_LIMIT);
        let lengths: Vec<usize> = segments.iter().map(|s| s.chars().count()).collect();
        assert_eq!(lengths, vec![2000, 2000, 500]);
        assert_eq!(segments.concat(), content);
    }

    #[test]
    fn split_text_counts_characters_not_bytes() {
        let content = "é".repeat(2001);
        let segments = split_text(&content, RICH_TEXT_LIMIT);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], "é");
    }

    #[test]
    fn split_text_empty_is_one_empty_segment() {
        assert_eq!(split_text("", RICH_TEXT_LIMIT), vec![String::new()]);
    }

    #[test]
    fn rich_text_links_every_segment() {
        let value = rich_text(&"x".repeat(2500), Some("https://a"));
        let segments = value.as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert!(segments
            .iter()
            .all(|s| s["text"]["link"]["url"] == "https://a"));
    }

    #[test]
    fn attachment_links_keep_first_position_and_last_url() {
        let (files, urls) = partition_attachments(&[
            attachment(false, "docs", "https://old"),
            attachment(false, "blog", "https://blog"),
            attachment(false, "docs", "https://new"),
            attachment(true, "img", "https://trello/img"),
        ]);
        assert_eq!(files.len(), 1);
        assert_eq!(urls.first(), Some(("docs", "https://new")));
        assert_eq!(urls.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec!["docs", "blog"]);
    }

    #[test]
    fn label_options_dedup_by_name_with_alias_colors() {
        let mut a = Item::new("1", "a", "L");
        a.labels = vec![Label { name: "lang".into(), color: "green".into() }];
        let mut b = Item::new("2", "b", "L");
        b.labels = vec![
            Label { name: "lang".into(), color: "sky".into() },
            Label { name: "todo".into(), color: "red".into() },
        ];
        let colors = BTreeMap::from([("sky".to_string(), "blue".to_string())]);
        let options = collect_label_options(&[a, b], &colors);
        assert_eq!(
            options,
            vec![
                LabelOption { name: "lang".into(), color: "blue".into() },
                LabelOption { name: "todo".into(), color: "red".into() },
            ]
        );
    }

    #[test]
    fn unnamed_labels_are_left_out() {
        let mut item = Item::new("1", "a", "L");
        item.labels = vec![
            Label { name: "".into(), color: "green".into() },
            Label { name: "  ".into(), color: "red".into() },
        ];
        assert!(collect_label_options(&[item.clone()], &BTreeMap::new()).is_empty());
        let body = build_page_request("db-1", &item, None);
        assert!(body["properties"].get(LABELS_PROPERTY).is_none());

        item.labels.push(Label { name: "lang".into(), color: "sky".into() });
        let options = collect_label_options(&[item.clone()], &BTreeMap::new());
        assert_eq!(options, vec![LabelOption { name: "lang".into(), color: "sky".into() }]);
        let body = build_page_request("db-1", &item, None);
        let selected = body["properties"][LABELS_PROPERTY]["multi_select"].as_array().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["name"], "lang");
    }

    #[test]
    fn schema_declares_all_fields() {
        let body = schema_properties(&[LabelOption { name: "lang".into(), color: "blue".into() }]);
        assert!(body[DESCRIPTION_PROPERTY]["rich_text"].is_object());
        assert!(body[PRIMARY_LINK_PROPERTY]["url"].is_object());
        assert!(body[LAST_UPDATED_PROPERTY]["date"].is_object());
        assert_eq!(body[LABELS_PROPERTY]["multi_select"]["options"][0]["color"], "blue");
    }

    #[test]
    fn page_request_properties() {
        let body = build_page_request("db-1", &sample_item(), Some(100));
        assert_eq!(body["parent"]["database_id"], "db-1");
        let props = &body["properties"];
        assert_eq!(props[TITLE_PROPERTY]["title"][0]["text"]["content"], "Learn Rust");
        assert_eq!(
            props[DESCRIPTION_PROPERTY]["rich_text"][0]["text"]["content"]
                .as_str()
                .unwrap()
                .len(),
            100
        );
        assert_eq!(props[PRIMARY_LINK_PROPERTY]["url"], "https://doc.rust-lang.org/book");
        assert_eq!(props[LAST_UPDATED_PROPERTY]["date"]["start"], "2021-08-19T07:08:01+00:00");
        assert_eq!(props[LABELS_PROPERTY]["multi_select"][0]["name"], "lang");
    }

    #[test]
    fn page_request_children_in_fixed_order() {
        let body = build_page_request("db-1", &sample_item(), Some(100));
        assert_eq!(
            block_types(&body),
            vec![
                "heading_1",
                "bulleted_list_item",
                "heading_1",
                "bulleted_list_item",
                "bulleted_list_item",
                "heading_1",
                "paragraph",
                "paragraph",
                "heading_1",
                "paragraph",
            ]
        );
        let children = body["children"].as_array().unwrap();
        assert_eq!(
            children[1]["bulleted_list_item"]["rich_text"][0]["text"]["link"]["url"],
            "https://trello/notes.pdf"
        );
        assert_eq!(
            children[9]["paragraph"]["rich_text"][0]["text"]["content"]
                .as_str()
                .unwrap()
                .len(),
            150
        );
    }

    #[test]
    fn page_request_without_truncation_or_optional_fields() {
        let mut item = Item::new("c2", "Bare", "Inbox");
        item.description = "short".into();
        let body = build_page_request("db-2", &item, None);
        let props = &body["properties"];
        assert!(props.get(PRIMARY_LINK_PROPERTY).is_none());
        assert!(props.get(LAST_UPDATED_PROPERTY).is_none());
        assert!(props.get(LABELS_PROPERTY).is_none());
        assert_eq!(props[DESCRIPTION_PROPERTY]["rich_text"][0]["text"]["content"], "short");
        assert_eq!(block_types(&body), vec!["heading_1", "heading_1", "heading_1"]);
    }
}
