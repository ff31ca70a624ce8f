//! Page rendering with templates compiled into the binary.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::post::{BlogPost, EditorForm, format_date};

pub const SITE_NAME: &str = "Saint Urbain";

const PARTIALS: [(&str, &str); 4] = [
    ("head", include_str!("../templates/partials/head.hbs")),
    ("nav", include_str!("../templates/partials/nav.hbs")),
    ("footer", include_str!("../templates/partials/footer.hbs")),
    ("about_section", include_str!("../templates/partials/about_section.hbs")),
];

const PAGES: [(&str, &str); 6] = [
    ("index", include_str!("../templates/index.hbs")),
    ("about", include_str!("../templates/about.hbs")),
    ("post", include_str!("../templates/post.hbs")),
    ("editor", include_str!("../templates/editor.hbs")),
    ("auth", include_str!("../templates/auth.hbs")),
    ("not_found", include_str!("../templates/not_found.hbs")),
];

/// Value cards on the about page
const VALUES: [(&str, &str); 6] = [
    ("Quality Content", "We champion well-researched, thoughtfully written content that adds value to our readers' lives."),
    ("Community First", "Our platform thrives on the diverse perspectives and experiences of our global community."),
    ("Global Reach", "Breaking down barriers to connect storytellers and readers from every corner of the world."),
    ("Excellence", "We strive for excellence in everything we do, from platform design to content curation."),
    ("Innovation", "Constantly evolving our platform with new features to enhance the writing experience."),
    ("Authenticity", "We celebrate authentic voices and encourage writers to share their genuine perspectives."),
];

const MILESTONES: [(&str, &str, &str); 4] = [
    ("2019", "The Beginning", "Started as a small blog with a vision to democratize storytelling and give voice to unheard stories."),
    ("2020", "Community Growth", "Reached our first 1,000 writers and launched collaborative writing features."),
    ("2022", "Global Expansion", "Expanded to serve writers in 50+ countries with multi-language support."),
    ("2024", "Innovation Era", "Launched new writing tools, analytics, and a community mentorship program."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// An article as shown in the grid
#[derive(Debug, Serialize)]
pub struct PostCard {
    pub id: String,
    /// DOM id the scroll animations key on
    pub card_id: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

impl PostCard {
    pub fn new(index: usize, post: &BlogPost) -> Self {
        PostCard {
            id: post.id.clone(),
            card_id: format!("blog-card-{}", index),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            date: format_date(&post.published_at),
            image: post.featured_image.clone(),
            tags: post.card_tags().to_vec(),
        }
    }
}

/// Landing page inputs
#[derive(Debug, Default)]
pub struct IndexPage<'a> {
    pub posts: &'a [BlogPost],
    pub user: Option<&'a str>,
    pub welcome: bool,
    pub notice: Option<&'a str>,
    /// Set when the article list could not be loaded
    pub load_error: bool,
}

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        for (name, source) in PARTIALS {
            registry.register_partial(name, source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, source)?;
        }
        Ok(Views { registry })
    }

    fn about_data() -> serde_json::Value {
        let values: Vec<_> = VALUES
            .iter()
            .map(|(title, description)| json!({ "title": title, "description": description }))
            .collect();
        let milestones: Vec<_> = MILESTONES
            .iter()
            .map(|(year, title, description)| {
                json!({ "year": year, "title": title, "description": description })
            })
            .collect();
        json!({ "values": values, "milestones": milestones })
    }

    pub fn index(&self, page: &IndexPage<'_>) -> Result<String> {
        let cards: Vec<PostCard> = page
            .posts
            .iter()
            .enumerate()
            .map(|(i, post)| PostCard::new(i, post))
            .collect();
        let data = json!({
            "site": SITE_NAME,
            "title": SITE_NAME,
            "user": page.user,
            "welcome": page.welcome && page.user.is_some(),
            "notice": page.notice,
            "posts": cards,
            "empty": cards.is_empty() && !page.load_error,
            "load_error": page.load_error,
            "about": Self::about_data(),
        });
        Ok(self.registry.render("index", &data)?)
    }

    pub fn about(&self, user: Option<&str>) -> Result<String> {
        let data = json!({
            "site": SITE_NAME,
            "title": format!("About · {}", SITE_NAME),
            "user": user,
            "about": Self::about_data(),
        });
        Ok(self.registry.render("about", &data)?)
    }

    /// Article detail; `post` is `None` for the "not found" state
    pub fn post(
        &self,
        post: Option<&BlogPost>,
        user: Option<&str>,
        notice: Option<&str>,
    ) -> Result<String> {
        let article = post.map(|post| {
            let paragraphs: Vec<&str> = post
                .content
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            json!({
                "id": post.id,
                "title": post.title,
                "excerpt": post.excerpt,
                "author": post.author,
                "date": format_date(&post.published_at),
                "updated": (post.updated_at != post.published_at)
                    .then(|| format_date(&post.updated_at)),
                "image": post.featured_image,
                "tags": post.tags,
                "paragraphs": paragraphs,
            })
        });
        let title = post.map(|p| p.title.as_str()).unwrap_or("Article not found");
        let data = json!({
            "site": SITE_NAME,
            "title": format!("{} · {}", title, SITE_NAME),
            "user": user,
            "notice": notice,
            "post": article,
        });
        Ok(self.registry.render("post", &data)?)
    }

    /// Editor for a new article (`editing` is `None`) or an existing one
    pub fn editor(
        &self,
        form: &EditorForm,
        editing: Option<&str>,
        user: Option<&str>,
        notice: Option<&str>,
    ) -> Result<String> {
        let action = match editing {
            Some(id) => format!("/edit/{}", id),
            None => "/create".to_string(),
        };
        let data = json!({
            "site": SITE_NAME,
            "title": if editing.is_some() { "Edit Article" } else { "Write New Article" },
            "user": user,
            "notice": notice,
            "editing": editing.is_some(),
            "cancel": editing.map(|id| format!("/blog/{}", id)).unwrap_or_else(|| "/".to_string()),
            "action": action,
            "form": form,
        });
        Ok(self.registry.render("editor", &data)?)
    }

    pub fn auth(&self, mode: AuthMode, notice: Option<&str>, next: &str) -> Result<String> {
        let signing_up = mode == AuthMode::SignUp;
        let data = json!({
            "site": SITE_NAME,
            "title": if signing_up { "Create Account" } else { "Welcome Back" },
            "signup": signing_up,
            "action": if signing_up { "/auth/signup" } else { "/auth/signin" },
            "notice": notice,
            "next": next,
        });
        Ok(self.registry.render("auth", &data)?)
    }

    pub fn not_found(&self, user: Option<&str>) -> Result<String> {
        let data = json!({
            "site": SITE_NAME,
            "title": format!("Not found · {}", SITE_NAME),
            "user": user,
        });
        Ok(self.registry.render("not_found", &data)?)
    }
}
