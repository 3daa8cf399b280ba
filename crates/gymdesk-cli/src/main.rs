// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use gymdesk_app::ScreenKind;
use gymdesk_testkit::demo_data;
use gymdesk_view::{
    CategoryFilter, CollectionController, EventBus, Keyword, Screen, ScreenSet, SearchStats,
    SelectAllState, parse_category_filter, parse_sort_spec,
};
use logging::Verbosity;
use runtime::DemoSource;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SEARCH_GRACE: Duration = Duration::from_secs(5);

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    logging::init_subscriber(Verbosity::from_flags(options.verbose, options.quiet))?;

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gymdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let latency = config.search_latency()?;
    let screen = options.screen.unwrap_or_else(|| config.default_screen());
    if options.check_only {
        tracing::info!(screen = screen.as_str(), ?latency, "config ok");
        return Ok(());
    }

    let mut source = DemoSource::new(demo_data(config.demo_seed(), config.demo_rows()));
    let mut screens = ScreenSet::new(EventBus::new(), latency);
    screens
        .reload_all(&mut source)
        .context("load demo data")?;

    let request = Request {
        screen,
        options: &options,
        search_timeout: latency + SEARCH_GRACE,
    };
    let report = match screen {
        ScreenKind::Employees => {
            query(&mut screens, &mut source, &request, |set| &mut set.employees)
        }
        ScreenKind::Members => query(&mut screens, &mut source, &request, |set| &mut set.members),
        ScreenKind::Equipment => {
            query(&mut screens, &mut source, &request, |set| &mut set.equipment)
        }
        ScreenKind::Products => {
            query(&mut screens, &mut source, &request, |set| &mut set.products)
        }
        ScreenKind::Suppliers => {
            query(&mut screens, &mut source, &request, |set| &mut set.suppliers)
        }
        ScreenKind::AuditLog => {
            query(&mut screens, &mut source, &request, |set| &mut set.audit_log)
        }
    }?;
    screens.dispose();

    if options.json {
        let rendered = serde_json::to_string_pretty(&report).context("encode report as JSON")?;
        println!("{rendered}");
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

/// What a screen shows after the requested operations.
#[derive(Debug, Serialize)]
struct ScreenReport {
    screen: ScreenKind,
    category: String,
    sort: String,
    search: String,
    selected: usize,
    total: usize,
    select_all: SelectAllState,
    deleted: Vec<i64>,
    refreshed: Vec<ScreenKind>,
    search_stats: SearchStats,
    rows: Vec<serde_json::Value>,
    #[serde(skip)]
    lines: Vec<String>,
}

impl ScreenReport {
    fn render_text(&self) -> String {
        let mut out = format!(
            "{} | category {} | sort {}",
            self.screen.label(),
            self.category,
            self.sort
        );
        if !self.search.is_empty() {
            out.push_str(&format!(" | search {:?}", self.search));
        }
        out.push('\n');
        for line in &self.lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!(
            "{} of {} selected ({})\n",
            self.selected,
            self.total,
            self.select_all.as_str()
        ));
        if !self.deleted.is_empty() {
            let ids = self
                .deleted
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("deleted: {ids}\n"));
        }
        out
    }
}

struct Request<'a> {
    screen: ScreenKind,
    options: &'a CliOptions,
    search_timeout: Duration,
}

/// Applies category, sort, search and selection to one screen, then the
/// optional delete, and reports what is displayed.
fn query<S, F>(
    screens: &mut ScreenSet,
    source: &mut DemoSource,
    request: &Request<'_>,
    controller_of: F,
) -> Result<ScreenReport>
where
    S: Screen,
    S::Record: Serialize,
    F: Fn(&mut ScreenSet) -> &mut CollectionController<S>,
{
    let Request {
        screen,
        options,
        search_timeout,
    } = *request;
    let controller = controller_of(screens);
    if let Some(raw) = &options.category {
        let category = parse_category_filter::<S>(raw).ok_or_else(|| {
            anyhow!(
                "unknown category {raw:?} for {}; use `all` or a status/category name",
                screen.label()
            )
        })?;
        controller.set_category_filter(category);
    }
    if let Some(raw) = &options.sort {
        let spec = parse_sort_spec::<S>(raw).ok_or_else(|| {
            anyhow!("unknown sort {raw:?} for {}; use <key>[:asc|desc]", screen.label())
        })?;
        controller.set_sort(spec.key, spec.direction);
    }
    if let Some(text) = &options.search {
        controller.search(text);
        controller
            .wait_for_search(search_timeout)
            .with_context(|| format!("search {} for {text:?}", screen.label()))?;
    }
    if options.select_all {
        controller.set_select_all(true);
    }

    let mut deleted = Vec::new();
    let mut refreshed = Vec::new();
    if options.delete_selected {
        deleted = screens.delete_selected(screen, source)?;
        refreshed = screens.refresh_dependents(source)?;
    }

    let controller = controller_of(screens);
    let aggregate = controller.aggregate();
    let category = match controller.category() {
        CategoryFilter::All => "all".to_owned(),
        CategoryFilter::Only(category) => category.keyword().to_owned(),
    };
    let sort = controller.sort();
    let mut rows = Vec::with_capacity(controller.displayed().len());
    let mut lines = Vec::with_capacity(controller.displayed().len());
    for row in controller.displayed() {
        rows.push(serde_json::to_value(row.record()).context("encode row as JSON")?);
        let marker = if row.is_selected() { "[x]" } else { "[ ]" };
        lines.push(format!("{marker} {}", S::search_fields(row.record()).join(" | ")));
    }

    Ok(ScreenReport {
        screen,
        category,
        sort: format!("{}:{}", sort.key.keyword(), sort.direction.as_str()),
        search: controller.search_text().to_owned(),
        selected: aggregate.selected,
        total: aggregate.total,
        select_all: aggregate.state(),
        deleted,
        refreshed,
        search_stats: controller.search_stats(),
        rows,
        lines,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    screen: Option<ScreenKind>,
    category: Option<String>,
    sort: Option<String>,
    search: Option<String>,
    select_all: bool,
    delete_selected: bool,
    json: bool,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    verbose: bool,
    quiet: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        screen: None,
        category: None,
        sort: None,
        search: None,
        select_all: false,
        delete_selected: false,
        json: false,
        print_config_path: false,
        print_example: false,
        check_only: false,
        verbose: false,
        quiet: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let path = required(&mut iter, "--config", "a file path")?;
                options.config_path = PathBuf::from(path);
            }
            "--screen" => {
                let raw = required(&mut iter, "--screen", "a screen name")?;
                let screen = ScreenKind::parse(&raw.to_ascii_lowercase()).ok_or_else(|| {
                    anyhow!("unknown screen {raw:?}; expected one of {}", screen_names())
                })?;
                options.screen = Some(screen);
            }
            "--category" => {
                options.category = Some(required(&mut iter, "--category", "a category name")?);
            }
            "--sort" => {
                options.sort = Some(required(&mut iter, "--sort", "<key>[:asc|desc]")?);
            }
            "--search" => {
                options.search = Some(required(&mut iter, "--search", "search text")?);
            }
            "--select-all" => {
                options.select_all = true;
            }
            "--delete-selected" => {
                options.delete_selected = true;
            }
            "--json" => {
                options.json = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--verbose" | "-v" => {
                options.verbose = true;
            }
            "--quiet" | "-q" => {
                options.quiet = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn required<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn screen_names() -> String {
    ScreenKind::ALL
        .iter()
        .map(|screen| screen.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_help() {
    println!("gymdesk");
    println!("  --config <path>            Use a specific config path");
    println!("  --screen <name>            One of: {}", screen_names());
    println!("  --category <name>          Category or status filter (`all` resets)");
    println!("  --sort <key>[:asc|desc]    Sort the filtered rows");
    println!("  --search <text>            Narrow the view to rows containing <text>");
    println!("  --select-all               Select every displayed row");
    println!("  --delete-selected          Delete the selected rows");
    println!("  --json                     Print the result as JSON");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-example-config     Print a config template");
    println!("  --check                    Validate config and exit");
    println!("  -v, --verbose              Debug logging on stderr");
    println!("  -q, --quiet                Errors only on stderr");
    println!("  --help                     Show this help");
}
