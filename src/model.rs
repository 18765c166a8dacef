use std::fmt;

use crate::config::RenderConfig;
use crate::foundation::error::{StripError, StripResult};

pub const MAX_PANELS: usize = 3;

/// A fully parsed strip, ready to render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComicDocument {
    pub title: String,
    pub author: String,
    pub date: ComicDate,
    pub external_id: String,
    pub panels: Vec<Panel>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Panel {
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    pub left: DialogSide,
    pub right: DialogSide,
    pub left_character: String,
    pub right_character: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DialogSide {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: DialogKind,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    #[default]
    Dialog,
    Thought,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl DialogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DialogKind::Dialog => "dialog",
            DialogKind::Thought => "thought",
        }
    }

    /// Asset key of the tail drawn under a balloon of this kind on `side`.
    pub fn tail_key(self, side: Side) -> String {
        format!("{}-{}", self.as_str(), side.as_str())
    }
}

impl Panel {
    pub fn dialog(&self, side: Side) -> &DialogSide {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn character(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_character,
            Side::Right => &self.right_character,
        }
    }

    pub fn has_narration(&self) -> bool {
        self.narration.as_deref().is_some_and(|n| !n.is_empty())
    }
}

impl ComicDocument {
    pub fn validate(&self) -> StripResult<()> {
        if self.panels.is_empty() || self.panels.len() > MAX_PANELS {
            return Err(StripError::validation(format!(
                "a comic has 1..={MAX_PANELS} panels, got {}",
                self.panels.len()
            )));
        }
        if self.external_id.trim().is_empty() {
            return Err(StripError::validation("external_id must be non-empty"));
        }
        Ok(())
    }

    /// `{author lowercased}-{external id}.png`
    pub fn output_file_name(&self) -> String {
        format!("{}-{}.png", self.author.to_lowercase(), self.external_id)
    }

    /// Every asset key a render of this document resolves, de-duplicated, in first-use order.
    pub fn required_asset_keys(&self, config: &RenderConfig) -> Vec<String> {
        let mut keys = vec![config.corner_asset_key.clone()];
        for panel in &self.panels {
            let candidates = [
                panel.background.clone(),
                panel.left_character.clone(),
                panel.right_character.clone(),
                panel.left.kind.tail_key(Side::Left),
                panel.right.kind.tail_key(Side::Right),
            ];
            for key in candidates {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

/// Calendar date of publication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComicDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ComicDate {
    pub fn new(year: u16, month: u8, day: u8) -> StripResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(StripError::validation(format!("month out of range: {month}")));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(StripError::validation(format!(
                "day out of range for {year}-{month:02}: {day}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Parse `YYYY-MM-DD`.
    pub fn parse_iso(s: &str) -> StripResult<Self> {
        let parts = split_numeric(s, [4, 2, 2])?;
        Self::new(parts[0] as u16, parts[1] as u8, parts[2] as u8)
    }

    /// Parse the strip header form `MM-DD-YY`; two-digit years land in 2000..=2099.
    pub fn parse_mdy(s: &str) -> StripResult<Self> {
        let parts = split_numeric(s, [2, 2, 2])?;
        Self::new(2000 + parts[2] as u16, parts[0] as u8, parts[1] as u8)
    }

    /// `M-DD-YY` as printed in the page header, e.g. `3-05-09`. Only the month loses its
    /// leading zero.
    pub fn mdy(&self) -> String {
        format!("{}-{:02}-{:02}", self.month, self.day, self.year % 100)
    }
}

impl fmt::Display for ComicDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl serde::Serialize for ComicDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ComicDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_iso(&s).map_err(serde::de::Error::custom)
    }
}

fn split_numeric(s: &str, widths: [usize; 3]) -> StripResult<[u32; 3]> {
    let bad = || StripError::validation(format!("invalid date '{s}'"));
    let mut out = [0u32; 3];
    let mut parts = s.trim().split('-');
    for (slot, width) in out.iter_mut().zip(widths) {
        let part = parts.next().ok_or_else(bad)?;
        if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        *slot = part.parse().map_err(|_| bad())?;
    }
    if parts.next().is_some() {
        return Err(bad());
    }
    Ok(out)
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(bg: &str, left: DialogKind, right: DialogKind) -> Panel {
        Panel {
            background: bg.to_string(),
            narration: None,
            left: DialogSide {
                text: "hi".to_string(),
                kind: left,
            },
            right: DialogSide {
                text: String::new(),
                kind: right,
            },
            left_character: "chars/bob".to_string(),
            right_character: "chars/amy".to_string(),
        }
    }

    fn doc(panels: Vec<Panel>) -> ComicDocument {
        ComicDocument {
            title: "Title".to_string(),
            author: "BenComic".to_string(),
            date: ComicDate::new(2009, 3, 5).unwrap(),
            external_id: "300194".to_string(),
            panels,
        }
    }

    #[test]
    fn mdy_strips_month_padding_only() {
        let d = ComicDate::parse_iso("2009-03-05").unwrap();
        assert_eq!(d.mdy(), "3-05-09");
        assert_eq!(ComicDate::parse_iso("2010-10-01").unwrap().mdy(), "10-01-10");
        assert_eq!(ComicDate::parse_iso("2011-12-25").unwrap().mdy(), "12-25-11");
    }

    #[test]
    fn parse_mdy_header_form() {
        assert_eq!(
            ComicDate::parse_mdy("03-05-09").unwrap(),
            ComicDate::new(2009, 3, 5).unwrap()
        );
        assert!(ComicDate::parse_mdy("3-5-09").is_err());
    }

    #[test]
    fn parse_iso_rejects_bad_dates() {
        assert!(ComicDate::parse_iso("2009-13-01").is_err());
        assert!(ComicDate::parse_iso("2009-02-29").is_err());
        assert!(ComicDate::parse_iso("2008-02-29").is_ok());
        assert!(ComicDate::parse_iso("2009-03-05-01").is_err());
        assert!(ComicDate::parse_iso("09-03-05").is_err());
    }

    #[test]
    fn tail_keys_combine_kind_and_side() {
        assert_eq!(DialogKind::Dialog.tail_key(Side::Left), "dialog-left");
        assert_eq!(DialogKind::Thought.tail_key(Side::Right), "thought-right");
    }

    #[test]
    fn validate_panel_count() {
        assert!(doc(vec![]).validate().is_err());
        let p = panel("bg/park", DialogKind::Dialog, DialogKind::Dialog);
        assert!(doc(vec![p.clone()]).validate().is_ok());
        assert!(doc(vec![p.clone(), p.clone(), p.clone(), p]).validate().is_err());
    }

    #[test]
    fn output_file_name_lowercases_author() {
        let p = panel("bg/park", DialogKind::Dialog, DialogKind::Dialog);
        assert_eq!(doc(vec![p]).output_file_name(), "bencomic-300194.png");
    }

    #[test]
    fn required_keys_are_deduplicated_in_order() {
        let cfg = RenderConfig::default();
        let d = doc(vec![
            panel("bg/park", DialogKind::Dialog, DialogKind::Thought),
            panel("bg/park", DialogKind::Dialog, DialogKind::Dialog),
        ]);
        assert_eq!(
            d.required_asset_keys(&cfg),
            vec![
                "balloon/upperleftcorner",
                "bg/park",
                "chars/bob",
                "chars/amy",
                "dialog-left",
                "thought-right",
                "dialog-right",
            ]
        );
    }

    #[test]
    fn document_json_uses_iso_date_and_lowercase_kinds() {
        let json = r#"{
            "title": "T", "author": "A", "date": "2009-03-05", "external_id": "1",
            "panels": [{
                "background": "bg", "left_character": "l", "right_character": "r",
                "left": {"text": "hello", "kind": "thought"},
                "right": {}
            }]
        }"#;
        let d: ComicDocument = serde_json::from_str(json).unwrap();
        assert_eq!(d.date, ComicDate::new(2009, 3, 5).unwrap());
        assert_eq!(d.panels[0].left.kind, DialogKind::Thought);
        assert_eq!(d.panels[0].right, DialogSide::default());
        assert!(!d.panels[0].has_narration());
    }
}
