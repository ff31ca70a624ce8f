//! Sample content loaded into an empty store.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::post::NewPost;
use crate::service::BlogService;

/// A fixture article
#[derive(Debug, Clone, Copy)]
pub struct SampleArticle {
    pub title: &'static str,
    pub excerpt: &'static str,
    pub content: &'static str,
    pub author: &'static str,
    pub tags: &'static [&'static str],
    pub featured_image: &'static str,
}

impl SampleArticle {
    pub fn to_new_post(&self) -> NewPost {
        NewPost {
            title: self.title.to_string(),
            content: self.content.to_string(),
            excerpt: self.excerpt.to_string(),
            author: self.author.to_string(),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            featured_image: Some(self.featured_image.to_string()),
        }
    }
}

const SAMPLE_ARTICLES: [SampleArticle; 10] = [
    SampleArticle {
        title: "The Rise of AI in Everyday Life",
        excerpt: "How AI is weaving into daily routines: smart assistants, personalized services, and more.",
        content: "Artificial Intelligence is no longer science fiction. From assistants recommending your next podcast to streaming services knowing your binge preferences, AI learns you. We break down chatbots in customer service, AI-powered home devices and even medical diagnostics.\n\nSmart home devices now anticipate our needs, adjusting temperature and lighting based on our patterns. Voice assistants have evolved from simple command processors to conversational partners that understand context.\n\nIn healthcare, diagnostic tools help doctors detect diseases earlier and more accurately. The future promises even more seamless integration, one algorithm at a time.",
        author: "Sarah Chen",
        tags: &["AI", "Technology", "Innovation"],
        featured_image: "https://unsplash.com/photos/ExozmFt-W6U/download?force=true&w=800",
    },
    SampleArticle {
        title: "Sustainable Tech: Green Gadgets for a Greener Planet",
        excerpt: "Showcasing eco-friendly tech innovations that care for Earth.",
        content: "Eco is the new edgy. Startups and giants alike are rolling out solar chargers, biodegradable phone cases and energy-efficient wearables. We spotlight green gadgets you can actually buy and weigh their real-world impact.\n\nKey innovations include bamboo keyboards, solar phone chargers that work even in cloudy conditions, and wearables made from recycled ocean plastic. These are genuinely competitive alternatives.\n\nThe movement is about rethinking our relationship with technology and consumption, so that innovation and environmental stewardship go hand in hand.",
        author: "Marcus Green",
        tags: &["Sustainability", "Technology", "Environment"],
        featured_image: "https://unsplash.com/photos/NodtnCsLdTE/download?force=true&w=800",
    },
    SampleArticle {
        title: "Mastering Remote Work: Tools & Tips That Actually Work",
        excerpt: "Real-world advice for efficiency, focus, and work-life balance.",
        content: "Remote work needs structure, tools and discipline. Here is a breakdown of productivity tools, remote-work rituals like Pomodoro breaks and digital detox, and ways of managing burnout.\n\nEffective remote workers swear by time-blocking, dedicated workspaces and clear communication protocols. Knowledge bases, project trackers and time trackers form the backbone of productive remote workflows.\n\nTechnology is only half the equation. Maintaining connections, setting boundaries and preserving mental health matter just as much.",
        author: "Alex Thompson",
        tags: &["Remote Work", "Productivity", "Work-Life Balance"],
        featured_image: "https://unsplash.com/photos/hpjSkU2UYSU/download?force=true&w=800",
    },
    SampleArticle {
        title: "Crypto for Beginners: How to Start Without Losing Money",
        excerpt: "A beginner-friendly dive into cryptocurrencies and safety tips.",
        content: "Crypto seems complicated, but it does not have to be. We explain Bitcoin versus Ethereum, wallets and exchanges, and simple strategies like dollar-cost averaging, plus the common traps: scams, hype and FOMO.\n\nBitcoin remains the digital gold standard. Ethereum powers a vast ecosystem of decentralized applications and smart contracts. Understanding the difference helps you make informed decisions.\n\nThe most important rule: never invest more than you can afford to lose.",
        author: "Raj Patel",
        tags: &["Cryptocurrency", "Finance", "Investment"],
        featured_image: "https://unsplash.com/photos/5fNmWej4tAA/download?force=true&w=800",
    },
    SampleArticle {
        title: "Top 5 Coding Languages to Learn in 2025",
        excerpt: "What programming languages are trending and why they matter.",
        content: "Python still rules data science, JavaScript is everywhere, Rust is charming systems programmers, Go dominates cloud infrastructure and TypeScript brings sanity to large JavaScript codebases.\n\nChoosing a programming language shapes the opportunities available to you. Each of these stands out for versatility, job market demand and future potential.\n\nStart with the one that aligns with your interests, then expand your toolkit as you grow.",
        author: "Dev Kumar",
        tags: &["Programming", "Technology", "Career"],
        featured_image: "https://unsplash.com/photos/F2KRf_QfCqw/download?force=true&w=800",
    },
    SampleArticle {
        title: "Personal Branding: Grow Your Presence Online",
        excerpt: "Building and curating your digital identity authentically.",
        content: "You are your brand. This post walks through defining your niche, crafting a consistent aesthetic, choosing platforms and posting smart, without burning out.\n\nStart by identifying your unique value proposition: the combination of skills, experiences and perspectives you offer. It becomes the foundation of your messaging everywhere.\n\nBuilding a personal brand is a marathon. Focus on providing value to your audience and growth will follow.",
        author: "Emma Rodriguez",
        tags: &["Personal Branding", "Social Media", "Career"],
        featured_image: "https://unsplash.com/photos/br1FOpZwf6I/download?force=true&w=800",
    },
    SampleArticle {
        title: "11 Mindfulness Habits to Boost Productivity",
        excerpt: "Practical, science-backed habits you can implement today.",
        content: "Peak output begins in a calm mind. We explore morning journaling, breathing breaks, mindful walking and gratitude logs, along with apps and timers that help.\n\nResearch shows mindful practices improve concentration, reduce anxiety and boost creative thinking. Three deep breaths before an important meeting can reset your mental state.\n\nStart small. Pick one or two practices, commit for a week, then expand.",
        author: "Dr. Lisa Wang",
        tags: &["Mindfulness", "Productivity", "Wellness"],
        featured_image: "https://unsplash.com/photos/mjRwhvqEC0U/download?force=true&w=800",
    },
    SampleArticle {
        title: "Urban Gardening: Grow Herbs on Your Windowsill",
        excerpt: "Simple steps to start a mini herb garden in your apartment.",
        content: "No backyard? No problem. We cover choosing herbs, selecting pots, indoor soils, watering schedules and pest-free tips, plus repurposed containers and LED setups.\n\nStart with easy herbs like basil, mint and parsley. Good drainage is crucial.\n\nSouth-facing windows get the most light; grow lights can supplement darker spaces. Watching seeds become thriving plants is its own reward.",
        author: "Green Thumb Guru",
        tags: &["Gardening", "Urban Living", "Sustainability"],
        featured_image: "https://unsplash.com/photos/6fK5Bohp9yE/download?force=true&w=800",
    },
    SampleArticle {
        title: "Top 8 Budget Travel Hacks in 2025",
        excerpt: "Smart, wallet-friendly strategies for savvy travelers.",
        content: "Travel on a dime is doable. This post covers booking hacks like midweek flights, hosting options, food on the cheap and free experiences such as city walks and festivals.\n\nComparison sites can save hundreds on airfare. Consider alternative airports and off-peak dates. Hostels, home-sharing and house-sitting dramatically reduce costs.\n\nThe real magic happens when you travel like a local. The goal is not to spend less, it is to experience more.",
        author: "Nomad Nancy",
        tags: &["Travel", "Budget", "Adventure"],
        featured_image: "https://unsplash.com/photos/sMgMdEU0EWk/download?force=true&w=800",
    },
    SampleArticle {
        title: "The Future of Learning: VR & AR in Education",
        excerpt: "Exploring how immersive tech is transforming classrooms.",
        content: "VR and AR are reshaping learning: immersive field trips, virtual labs for medicine and engineering, AR overlays for history, and real pilot projects.\n\nStudents can walk through ancient Rome, manipulate molecular structures or practice surgical procedures in risk-free virtual environments.\n\nCost and accessibility remain challenges, but pilot programs worldwide show the potential of immersive learning.",
        author: "Future Ed",
        tags: &["Education", "VR", "AR", "Technology"],
        featured_image: "https://unsplash.com/photos/6MePtA9EVDA/download?force=true&w=800",
    },
];

pub fn sample_articles() -> &'static [SampleArticle] {
    &SAMPLE_ARTICLES
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub added: usize,
    pub failed: usize,
}

/// Whether the store holds any article. Listing errors count as empty.
pub async fn articles_exist(service: &BlogService) -> bool {
    match service.all_posts().await {
        Ok(posts) => !posts.is_empty(),
        Err(e) => {
            log::error!("Error checking existing articles: {}", e);
            false
        }
    }
}

/// Insert every sample article; one failing insert does not stop the rest
pub async fn seed_database(service: &BlogService) -> SeedReport {
    log::info!("Seeding store with {} sample articles", SAMPLE_ARTICLES.len());
    let mut report = SeedReport::default();
    for article in sample_articles() {
        match service.create(article.to_new_post()).await {
            Ok(_) => {
                log::info!("Added article: {}", article.title);
                report.added += 1;
            }
            Err(e) => {
                log::error!("Failed to add article {}: {}", article.title, e);
                report.failed += 1;
            }
        }
    }
    log::info!(
        "Seeding completed: {} added, {} failed",
        report.added,
        report.failed
    );
    report
}

/// Seed when the store is empty. Returns `None` when nothing was done.
pub async fn seed_if_empty(service: &BlogService) -> Option<SeedReport> {
    if articles_exist(service).await {
        return None;
    }
    log::info!("No articles found, seeding store");
    Some(seed_database(service).await)
}

/// [`seed_if_empty`], at most once for a given guard
pub async fn seed_once(service: &BlogService, guard: &AtomicBool) -> Option<SeedReport> {
    if guard.swap(true, Ordering::SeqCst) {
        return None;
    }
    seed_if_empty(service).await
}
