pub mod cache;
pub mod config;
pub mod i18n;
pub mod logger;
pub mod policy;
pub mod position;
pub mod reuse_tab;
pub mod router;
pub mod scheduler;
pub mod types;

pub use cache::{CacheOptions, MatchMode, MemoryCache, MenuEntry, RouteCache};
pub use config::ReuseTabConfig;
pub use i18n::{Catalog, Language, TitleResolver, Translator};
pub use reuse_tab::ReuseTab;
pub use router::{MemoryRouter, NavigationOutcome, Navigator, RouteData, RouteSnapshot};
pub use scheduler::{EventScheduler, Trigger};
pub use types::{
    Activation, CacheAction, CacheNotify, CachedEntry, ContextCloseEvent, ContextCloseKind,
    ReuseItem, ReuseTabEvent, ReuseTitle,
};
