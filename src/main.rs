use anyhow::{Context as _, Result};
use reuse_tab::{
    Catalog, ContextCloseEvent, ContextCloseKind, Language, MemoryCache, MemoryRouter, MenuEntry,
    Navigator, ReuseTab, ReuseTabConfig, ReuseTabEvent, RouteData, RouteSnapshot, logger,
};
use serde::Deserialize;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

const BUILTIN_SCENARIO: &str = include_str!("../demos/basic.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: ReuseTabConfig,
    language: Option<Language>,
    #[serde(default)]
    menus: Vec<MenuEntry>,
    #[serde(default)]
    routes: Vec<RouteDef>,
    #[serde(default = "default_initial")]
    initial: String,
    #[serde(default)]
    steps: Vec<Step>,
}

fn default_initial() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize)]
struct RouteDef {
    url: String,
    #[serde(default)]
    data: RouteData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Visit(String),
    Click(usize),
    Close(usize),
    CloseRight(usize),
    Clear(bool),
    Guard(String),
    Language(Language),
}

type Strip = ReuseTab<Rc<RefCell<MemoryCache>>, MemoryRouter>;

fn load_scenario() -> Result<Scenario> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid scenario {}", path.display()))
        }
        None => serde_json::from_str(BUILTIN_SCENARIO).context("invalid builtin scenario"),
    }
}

fn render(tab: &Strip) -> String {
    tab.list()
        .iter()
        .map(|item| {
            let mut label = item.title.clone();
            if item.closable {
                label.push_str(" x");
            }
            if item.active {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn report(tab: &mut Strip, step: &str) {
    let events = tab.take_events();
    let closed: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            ReuseTabEvent::Close(Some(item)) => Some(item.url.as_str()),
            _ => None,
        })
        .collect();
    println!(
        "{step:<24} {} @ {}",
        render(tab),
        tab.navigator().current_url()
    );
    if !closed.is_empty() {
        println!("{:<24} closed {}", "", closed.join(", "));
    }
    if !tab.is_visible() {
        println!("{:<24} (strip hidden)", "");
    }
}

fn context_event(
    tab: &Strip,
    kind: ContextCloseKind,
    index: usize,
    incl: bool,
) -> Option<ContextCloseEvent> {
    tab.list().get(index).cloned().map(|item| ContextCloseEvent {
        kind,
        item,
        include_non_closeable: incl,
    })
}

fn run(scenario: Scenario) -> Result<()> {
    if scenario.config.debug && !logger::debug_enabled() {
        logger::initialize(true);
    }
    let catalog = Rc::new(RefCell::new(Catalog::load(
        scenario.language.unwrap_or_else(Language::detect),
    )?));

    let cache = Rc::new(RefCell::new(MemoryCache::new().with_menus(scenario.menus)));
    let mut router = MemoryRouter::new(&scenario.initial).with_reuse_strategy(cache.clone());
    for route in scenario.routes {
        router.register(RouteSnapshot::new(&route.url).with_data(route.data));
    }

    let mut tab = ReuseTab::new(scenario.config, cache, router)?
        .with_translator(Box::new(catalog.clone()));
    tab.init(Instant::now());
    report(&mut tab, "init");

    for step in scenario.steps {
        let label = format!("{step:?}").to_lowercase();
        match step {
            Step::Visit(url) => {
                tab.navigator_mut().navigate_by_url(&url);
            }
            Step::Click(index) => {
                tab.activate(index);
            }
            Step::Close(index) => {
                if let Some(event) = context_event(&tab, ContextCloseKind::Close, index, false) {
                    tab.cm_change(event);
                }
            }
            Step::CloseRight(index) => {
                if let Some(event) = context_event(&tab, ContextCloseKind::CloseRight, index, false)
                {
                    tab.cm_change(event);
                }
            }
            Step::Clear(include_non_closeable) => {
                if let Some(event) =
                    context_event(&tab, ContextCloseKind::Clear, 0, include_non_closeable)
                {
                    tab.cm_change(event);
                }
            }
            Step::Guard(url) => tab.navigator_mut().guard(&url),
            Step::Language(language) => catalog.borrow_mut().set_language(language)?,
        }

        let now = Instant::now();
        tab.pump(now);
        if let Some(deadline) = tab.next_deadline() {
            tab.pump(deadline.max(now));
        }
        report(&mut tab, &label);
    }

    tab.dispose();
    Ok(())
}

fn main() {
    let debug = std::env::var_os("REUSE_TAB_DEBUG").is_some();
    logger::initialize(debug);
    if debug {
        logger::enable_file_logging();
    }

    if let Err(err) = load_scenario().and_then(run) {
        eprintln!("[reuse-tab] {err:#}");
        std::process::exit(1);
    }
}
