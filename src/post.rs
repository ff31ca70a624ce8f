//! Article model and translation to the hosted table schema.
//!
//! Pages and the JSON API speak [`BlogPost`] (camelCase on the wire). The
//! hosted `blog_posts` table speaks [`PostRow`], with snake_case columns and
//! nullable `excerpt`, `tags` and `featured_image`. Everything that crosses
//! between the two goes through the conversions in this module.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Images used when an article is saved without a featured image
pub const PLACEHOLDER_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1445205170230-053b83016050?auto=format&fit=crop&w=1200&q=80",
    "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?auto=format&fit=crop&w=1200&q=80",
    "https://images.unsplash.com/photo-1558618047-3c8c76ca7d13?auto=format&fit=crop&w=1200&q=80",
    "https://images.unsplash.com/photo-1469334031218-e382a71b716b?auto=format&fit=crop&w=1200&q=80",
    "https://images.unsplash.com/photo-1506629905687-4775709b9e3e?auto=format&fit=crop&w=1200&q=80",
];

/// Number of tags rendered on an article card
pub const CARD_TAG_LIMIT: usize = 3;

/// An article as the pages and the JSON API see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

impl BlogPost {
    /// Tags shown on a card in the article grid
    pub fn card_tags(&self) -> &[String] {
        let end = self.tags.len().min(CARD_TAG_LIMIT);
        &self.tags[..end]
    }
}

/// Fields supplied when publishing a new article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<()> {
        require_fields(&[&self.title, &self.content, &self.author])
    }

    /// Insert body for the hosted table
    pub fn insert_row(&self) -> Value {
        serde_json::json!({
            "title": self.title,
            "content": self.content,
            "excerpt": self.excerpt,
            "author": self.author,
            "tags": self.tags,
            "featured_image": self.featured_image,
        })
    }
}

/// Partial update of an existing article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl PostPatch {
    /// Update body for the hosted table.
    ///
    /// Text fields and tags are only sent when they carry a value; an empty
    /// title never overwrites a stored one. The featured image is sent whenever
    /// it is present so it can be cleared.
    pub fn update_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        let texts = [
            ("title", &self.title),
            ("content", &self.content),
            ("excerpt", &self.excerpt),
            ("author", &self.author),
        ];
        for (column, value) in texts {
            if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
                row.insert(column.to_string(), Value::String(v.clone()));
            }
        }
        if let Some(tags) = self.tags.as_ref().filter(|t| !t.is_empty()) {
            row.insert("tags".to_string(), serde_json::json!(tags));
        }
        if let Some(image) = &self.featured_image {
            row.insert("featured_image".to_string(), Value::String(image.clone()));
        }
        row
    }

    pub fn is_empty(&self) -> bool {
        self.update_row().is_empty()
    }
}

impl From<NewPost> for PostPatch {
    fn from(post: NewPost) -> Self {
        PostPatch {
            title: Some(post.title),
            content: Some(post.content),
            excerpt: Some(post.excerpt),
            author: Some(post.author),
            tags: Some(post.tags),
            featured_image: post.featured_image,
        }
    }
}

/// A row of the hosted `blog_posts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        BlogPost {
            id: row.id,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt.unwrap_or_default(),
            author: row.author,
            published_at: row.published_at,
            updated_at: row.updated_at,
            tags: row.tags.unwrap_or_default(),
            featured_image: row.featured_image,
        }
    }
}

/// Raw fields posted by the article editor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    /// Comma-separated tag list
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub featured_image: String,
}

impl EditorForm {
    /// Pre-fill the editor from a stored article
    pub fn from_post(post: &BlogPost) -> Self {
        EditorForm {
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            tags: post.tags.join(", "),
            featured_image: post.featured_image.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_fields(&[&self.title, &self.content, &self.author])
    }

    /// Validate and convert, picking a placeholder image when none was given
    pub fn into_new_post<R: Rng + ?Sized>(self, rng: &mut R) -> Result<NewPost> {
        self.validate()?;
        let image = self.featured_image.trim();
        let featured_image = if image.is_empty() {
            PLACEHOLDER_IMAGES.choose(rng).map(|url| url.to_string())
        } else {
            Some(image.to_string())
        };
        Ok(NewPost {
            tags: parse_tags(&self.tags),
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            author: self.author,
            featured_image,
        })
    }
}

/// Title, content and author must not be blank
fn require_fields(fields: &[&str]) -> Result<()> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(Error::Validation(
            "Please fill in all required fields.".to_string(),
        ));
    }
    Ok(())
}

/// Split a comma-separated tag list, trimming and dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Long US date, e.g. `January 15, 2024`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn row() -> PostRow {
        PostRow {
            id: "abc".into(),
            title: "The Beauty of Minimalism".into(),
            content: "Less is often more.".into(),
            excerpt: None,
            author: "Peter Laurent".into(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 10, 14, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 10, 14, 30, 0).unwrap(),
            tags: None,
            featured_image: None,
        }
    }

    #[test]
    fn row_nulls_are_coalesced() {
        let post = BlogPost::from(row());
        assert_eq!(post.excerpt, "");
        assert!(post.tags.is_empty());
        assert_eq!(post.featured_image, None);
    }

    #[test]
    fn row_parses_hosted_timestamps() {
        let json = r#"{
            "id": "7d3c",
            "title": "t",
            "content": "c",
            "excerpt": "e",
            "author": "a",
            "published_at": "2024-01-15T10:00:00.123456+00:00",
            "updated_at": "2024-01-15T10:00:00+00:00",
            "tags": ["fashion"],
            "featured_image": null
        }"#;
        let row: PostRow = serde_json::from_str(json).unwrap();
        let post = BlogPost::from(row);
        assert_eq!(format_date(&post.published_at), "January 15, 2024");
        assert_eq!(post.tags, vec!["fashion".to_string()]);
    }

    #[test]
    fn post_json_uses_camel_case() {
        let mut post = BlogPost::from(row());
        post.featured_image = Some("img.jpg".into());
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert_eq!(json["featuredImage"], "img.jpg");
        assert!(json.get("published_at").is_none());
    }

    #[test]
    fn insert_row_renames_columns() {
        let post = NewPost {
            title: "t".into(),
            content: "c".into(),
            excerpt: "".into(),
            author: "a".into(),
            tags: vec!["x".into()],
            featured_image: Some("i".into()),
        };
        let row = post.insert_row();
        assert_eq!(row["featured_image"], "i");
        assert!(row.get("featuredImage").is_none());
    }

    #[test]
    fn update_row_skips_empty_fields() {
        let patch = PostPatch {
            title: Some("".into()),
            content: Some("new body".into()),
            tags: Some(vec![]),
            featured_image: Some("".into()),
            ..Default::default()
        };
        let row = patch.update_row();
        assert!(!row.contains_key("title"));
        assert!(!row.contains_key("tags"));
        assert_eq!(row["content"], "new body");
        assert_eq!(row["featured_image"], "");
        assert!(!PostPatch::default().update_row().contains_key("featured_image"));
        assert!(PostPatch::default().is_empty());
    }

    #[test]
    fn tags_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_tags(" AI, Technology ,, Innovation ,"),
            vec!["AI", "Technology", "Innovation"]
        );
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn card_shows_at_most_three_tags() {
        let mut post = BlogPost::from(row());
        post.tags = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(post.card_tags().len(), 3);
        post.tags.truncate(1);
        assert_eq!(post.card_tags(), &["a".to_string()]);
    }

    #[test]
    fn editor_requires_title_content_and_author() {
        let form = EditorForm {
            title: "  ".into(),
            content: "body".into(),
            author: "me".into(),
            ..Default::default()
        };
        match form.validate() {
            Err(Error::Validation(msg)) => assert_eq!(msg, "Please fill in all required fields."),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn editor_falls_back_to_placeholder_image() {
        let mut rng = StdRng::seed_from_u64(7);
        let form = EditorForm {
            title: "Title".into(),
            content: "Body".into(),
            author: "Author".into(),
            tags: "one, two".into(),
            ..Default::default()
        };
        let post = form.into_new_post(&mut rng).unwrap();
        let image = post.featured_image.unwrap();
        assert!(PLACEHOLDER_IMAGES.contains(&image.as_str()));
        assert_eq!(post.tags, vec!["one", "two"]);
    }

    #[test]
    fn editor_round_trips_stored_post() {
        let mut post = BlogPost::from(row());
        post.tags = vec!["a".into(), "b".into()];
        let form = EditorForm::from_post(&post);
        assert_eq!(form.tags, "a, b");
        assert_eq!(form.featured_image, "");
    }
}
