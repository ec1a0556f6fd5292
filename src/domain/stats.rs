use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Label used for groups that arrive without a `word`.
pub const UNCATEGORIZED: &str = "未分类";

/// One keyword group from the upstream news statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupStat {
    #[serde(default = "uncategorized", deserialize_with = "word_or_uncategorized")]
    pub word: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub titles: Vec<TitleEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_name: String,
}

/// A title entry tagged with the group it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub group: String,
    pub title: String,
    pub source: String,
}

impl GroupStat {
    pub fn new(word: impl Into<String>, titles: Vec<TitleEntry>) -> Self {
        Self {
            word: word.into(),
            titles,
        }
    }
}

impl TitleEntry {
    pub fn new(title: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_name: source_name.into(),
        }
    }
}

fn uncategorized() -> String {
    UNCATEGORIZED.to_string()
}

fn word_or_uncategorized<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(uncategorized))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flatten groups into news items, keeping group order then title order.
pub fn flatten_groups(groups: &[GroupStat]) -> Vec<NewsItem> {
    groups
        .iter()
        .flat_map(|group| {
            group.titles.iter().map(move |entry| NewsItem {
                group: group.word.clone(),
                title: entry.title.clone(),
                source: entry.source_name.clone(),
            })
        })
        .collect()
}

/// News items bucketed by group, in the order groups were first seen.
///
/// Each bucket holds at most `cap` items. Later items for a full bucket are
/// dropped, but scanning continues so other groups still fill up.
#[derive(Debug, Default)]
pub struct ProcessedGroups {
    buckets: Vec<(String, Vec<NewsItem>)>,
    index: HashMap<String, usize>,
}

impl ProcessedGroups {
    pub fn from_items(items: Vec<NewsItem>, cap: usize) -> Self {
        let mut processed = Self::default();

        for item in items {
            let slot = match processed.index.get(&item.group) {
                Some(&slot) => slot,
                None => {
                    let slot = processed.buckets.len();
                    processed.index.insert(item.group.clone(), slot);
                    processed.buckets.push((item.group.clone(), Vec::new()));
                    slot
                }
            };

            let bucket = &mut processed.buckets[slot].1;
            if bucket.len() < cap {
                bucket.push(item);
            }
        }

        processed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NewsItem])> {
        self.buckets
            .iter()
            .map(|(group, items)| (group.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(group: &str, title: &str) -> NewsItem {
        NewsItem {
            group: group.to_string(),
            title: title.to_string(),
            source: String::new(),
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let groups: Vec<GroupStat> = serde_json::from_str(
            r#"[{"titles":[{"source_name":"weibo"}]},{"word":null,"titles":null},{"word":"AI"}]"#,
        )
        .unwrap();

        assert_eq!(groups[0].word, UNCATEGORIZED);
        assert_eq!(groups[0].titles, vec![TitleEntry::new("", "weibo")]);
        assert_eq!(groups[1].word, UNCATEGORIZED);
        assert!(groups[1].titles.is_empty());
        assert_eq!(groups[2].word, "AI");
        assert!(groups[2].titles.is_empty());
    }

    #[test]
    fn extra_upstream_fields_are_ignored() {
        let groups: Vec<GroupStat> = serde_json::from_str(
            r#"[{"word":"AI","count":3,"percentage":12.5,
                 "titles":[{"title":"t","source_name":"s","url":"http://x","ranks":[1,2]}]}]"#,
        )
        .unwrap();

        assert_eq!(groups, vec![GroupStat::new("AI", vec![TitleEntry::new("t", "s")])]);
    }

    #[test]
    fn flatten_keeps_group_then_title_order() {
        let groups = vec![
            GroupStat::new("B", vec![TitleEntry::new("b1", "x"), TitleEntry::new("b2", "y")]),
            GroupStat::new("A", vec![TitleEntry::new("a1", "z")]),
        ];

        let items = flatten_groups(&groups);
        let titles: Vec<_> = items.iter().map(|i| (i.group.as_str(), i.title.as_str())).collect();
        assert_eq!(titles, vec![("B", "b1"), ("B", "b2"), ("A", "a1")]);
        assert_eq!(items[2].source, "z");
    }

    #[test]
    fn buckets_are_capped_and_keep_first_seen_order() {
        let mut items: Vec<_> = (1..=7).map(|n| item("Z", &format!("z{n}"))).collect();
        items.insert(3, item("A", "a1"));
        items.push(item("A", "a2"));

        let processed = ProcessedGroups::from_items(items, 5);
        let groups: Vec<_> = processed
            .iter()
            .map(|(group, items)| {
                let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
                (group, titles)
            })
            .collect();

        assert_eq!(
            groups,
            vec![
                ("Z", vec!["z1", "z2", "z3", "z4", "z5"]),
                ("A", vec!["a1", "a2"]),
            ]
        );
    }

    #[test]
    fn repeated_group_label_shares_a_bucket() {
        let items = vec![item("X", "1"), item("Y", "2"), item("X", "3")];
        let processed = ProcessedGroups::from_items(items, 5);

        assert_eq!(processed.len(), 2);
        let (group, bucket) = processed.iter().next().unwrap();
        assert_eq!(group, "X");
        assert_eq!(bucket.len(), 2);
    }
}
