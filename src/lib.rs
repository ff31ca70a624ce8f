/*!
# Atelier

An editorial blog site with scroll-driven animations, built in Rust.

## Overview

The site has a hero landing page that lists the latest articles, an "About"
page, article detail pages, and an editor for signed-in writers. Articles
live in a hosted PostgREST table (Supabase) or, when no credentials are
configured, in a local JSON file.

## Architecture

### Frontend Layer
- **Technologies**: server-rendered HTML (Handlebars), CSS, WebAssembly
- **Key Components**:
  - Landing page with hero, article grid and about section
  - Article detail and editor pages
  - Sign-in / sign-up page
  - Scroll animation engine, optionally compiled to WebAssembly

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Post model and translation to the hosted table schema
  - Post stores (hosted REST table, local file)
  - Cached data-access service
  - Sample content seeding
  - Accounts and cookie sessions

### Animation Engine
- Easing curves, tween timelines and scroll triggers
- Orchestrator binding blog cards, headings, images, navigation and page
  sections to scroll positions
- Hover, magnetic and ripple interactions
- Recording of scroll-driven progress, replay schedules and gzip trace
  archives

## Modules

- **post**: article model, editor form and schema translation
- **store**: `PostStore` trait with REST and file implementations
- **service**: cached facade used by the pages
- **seed**: fixture articles for an empty store
- **auth**: accounts, sessions and the sign-in gate
- **views**: page rendering
- **animation**: the headless animation engine
- **app**: routing and handlers

## REST API Endpoints

- `GET /api/posts`, `GET /api/posts/:id` - Read articles
- `POST /api/posts`, `PUT /api/posts/:id`, `DELETE /api/posts/:id` - Write
  articles (signed in)
- `GET /api/session` - Current session
- `POST /api/animations/replay` - Replay schedule for a recorded trace
*/

pub mod animation;
pub mod error;
pub mod post;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod auth;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod seed;
#[cfg(feature = "web")]
pub mod service;
#[cfg(feature = "web")]
pub mod store;
#[cfg(feature = "web")]
pub mod views;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};
pub use post::{BlogPost, NewPost, PostPatch};
