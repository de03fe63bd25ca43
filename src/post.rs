use crate::date::PostDate;
use crate::value::{RawFrontmatter, Value};

/// Validated frontmatter of a post in the `blog` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFrontmatter {
    pub title: String,
    pub description: String,
    pub pub_date: PostDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<PostDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    // Empty when the post has no history, never absent
    pub updates: Vec<Update>,
}

/// One entry of a post's update history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub date: PostDate,
    pub message: String,
}

impl PostFrontmatter {
    /// Most recent modification date, from `updatedDate` or the update history.
    pub fn last_updated(&self) -> Option<PostDate> {
        self.updates
            .iter()
            .map(|u| u.date)
            .chain(self.updated_date)
            .max()
    }

    /// The raw form of this record, with dates kept as structured values so that any
    /// representable date survives. Validating it yields this record again.
    pub fn to_raw(&self) -> RawFrontmatter {
        let mut raw = RawFrontmatter::new();
        raw.insert("title".into(), self.title.as_str().into());
        raw.insert("description".into(), self.description.as_str().into());
        raw.insert("pubDate".into(), self.pub_date.into());
        if let Some(date) = self.updated_date {
            raw.insert("updatedDate".into(), date.into());
        }
        if let Some(image) = &self.hero_image {
            raw.insert("heroImage".into(), image.as_str().into());
        }
        if !self.updates.is_empty() {
            let updates = self.updates.iter().map(Update::to_raw).collect::<Vec<_>>();
            raw.insert("updates".into(), Value::Sequence(updates));
        }
        raw
    }
}

impl Update {
    fn to_raw(&self) -> Value {
        let mut raw = RawFrontmatter::new();
        raw.insert("date".into(), self.date.into());
        raw.insert("message".into(), self.message.as_str().into());
        Value::Mapping(raw)
    }
}
