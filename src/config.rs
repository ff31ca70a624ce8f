use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Default table holding the articles on the hosted store
pub const DEFAULT_TABLE: &str = "blog_posts";

/// Runtime configuration, read from flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "atelier", version, about = "Editorial blog site")]
pub struct SiteConfig {
    /// Address the web server listens on
    #[arg(long, env = "ATELIER_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Directory for accounts and the local post file
    #[arg(long, env = "ATELIER_DATA_DIR", default_value = "database")]
    pub data_dir: PathBuf,

    /// Base URL of the hosted database (e.g. https://xyz.supabase.co)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Public API key for the hosted database
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Table holding the articles
    #[arg(long, env = "ATELIER_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Directory served under /static
    #[arg(long, env = "ATELIER_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Skip populating an empty store with sample articles
    #[arg(long, env = "ATELIER_NO_SEED")]
    pub no_seed: bool,
}

/// Where posts are kept
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Rest {
        url: String,
        key: String,
        table: String,
    },
    File {
        path: PathBuf,
    },
}

impl SiteConfig {
    /// Configuration for a throwaway site rooted at `data_dir`
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        SiteConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: data_dir.into(),
            supabase_url: None,
            supabase_key: None,
            table: DEFAULT_TABLE.to_string(),
            static_dir: PathBuf::from("static"),
            no_seed: false,
        }
    }

    /// Hosted store when both URL and key are set, local file otherwise
    pub fn backend(&self) -> StoreBackend {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => StoreBackend::Rest {
                url: url.clone(),
                key: key.clone(),
                table: self.table.clone(),
            },
            _ => StoreBackend::File {
                path: self.data_dir.join("posts.json"),
            },
        }
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_hosted_store() {
        let config = SiteConfig::parse_from([
            "atelier",
            "--supabase-url",
            "https://example.supabase.co",
            "--supabase-key",
            "anon",
        ]);
        assert_eq!(
            config.backend(),
            StoreBackend::Rest {
                url: "https://example.supabase.co".into(),
                key: "anon".into(),
                table: "blog_posts".into(),
            }
        );
    }

    #[test]
    fn missing_key_falls_back_to_file_store() {
        let mut config = SiteConfig::local("data");
        config.supabase_url = Some("https://example.supabase.co".into());
        assert_eq!(
            config.backend(),
            StoreBackend::File {
                path: PathBuf::from("data").join("posts.json")
            }
        );
        assert_eq!(config.users_file(), PathBuf::from("data").join("users.json"));
    }
}
