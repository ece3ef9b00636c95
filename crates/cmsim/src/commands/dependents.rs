//! Device and station command handlers, plus the shared page browser.
//!
//! Every paged listing goes through `cmsim_core::Browser`: mount, optional
//! owner selection, optional page change, each settled before the next.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;

use cmsim_core::{
    Browser, BrowserController, DependentItem, Device, Instance, OwnerScope, ScreenConfig,
    SimulatorClient, Station,
};

use crate::cli::{DependentArgs, DependentCommand, DependentListArgs, GlobalOpts, OutputFormat};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

pub type PageBrowser<D> = Browser<SimulatorClient, Instance, D>;

// ── Browsing ────────────────────────────────────────────────────────

/// Owner constraint requested on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub instance: Option<i64>,
    pub instance_ip: Option<&'a str>,
    pub page: u32,
}

impl<'a> From<&'a DependentListArgs> for Target<'a> {
    fn from(args: &'a DependentListArgs) -> Self {
        Self {
            instance: args.instance,
            instance_ip: args.instance_ip.as_deref(),
            page: args.page,
        }
    }
}

/// Mount a browser and walk it to the requested owner and page.
pub async fn browse<D>(
    client: Arc<SimulatorClient>,
    screen: ScreenConfig,
    target: Target<'_>,
) -> Result<PageBrowser<D>, CliError>
where
    D: DependentItem + DeserializeOwned,
{
    let mut browser = Browser::new(client, screen);
    browser.mount();
    browser.settle().await;

    let scope = resolve_scope(&mut browser, target)?;
    if scope != OwnerScope::All {
        if !browser.select(scope) {
            return Err(master_unavailable(browser.controller()));
        }
        browser.settle().await;
    }

    if target.page != browser.controller().page_num() {
        ensure_loaded(browser.controller())?;
        if !browser.change_page(target.page) {
            return Err(CliError::Validation {
                field: "page".into(),
                reason: format!(
                    "page {} is out of range (1-{})",
                    target.page,
                    browser.controller().total_pages()
                ),
            });
        }
        browser.settle().await;
    }

    ensure_loaded(browser.controller())?;
    Ok(browser)
}

/// Turn `--instance` / `--instance-ip` into a scope.
///
/// An explicit id is used as-is. IP text goes through the master filter and
/// must single out one instance, or match one display key exactly.
fn resolve_scope<D>(
    browser: &mut PageBrowser<D>,
    target: Target<'_>,
) -> Result<OwnerScope, CliError>
where
    D: DependentItem + DeserializeOwned,
{
    if let Some(id) = target.instance {
        return Ok(OwnerScope::Owner(id));
    }
    let Some(query) = target.instance_ip else {
        return Ok(OwnerScope::All);
    };

    if browser.controller().master().is_failed() {
        return Err(master_unavailable(browser.controller()));
    }
    browser.set_query(query);
    let matches = browser.controller().filtered_masters();

    let exact = matches
        .iter()
        .find(|inst| inst.http_ip.eq_ignore_ascii_case(query.trim()));
    match (matches.len(), exact) {
        (0, _) => Err(CliError::NoMatch {
            query: query.into(),
        }),
        (1, _) => Ok(OwnerScope::Owner(matches[0].id)),
        (_, Some(inst)) => Ok(OwnerScope::Owner(inst.id)),
        (count, None) => Err(CliError::Ambiguous {
            query: query.into(),
            count,
            candidates: matches
                .iter()
                .map(|inst| format!("{} ({})", inst.http_ip, inst.id))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn master_unavailable<D>(controller: &BrowserController<Instance, D>) -> CliError
where
    D: DependentItem,
{
    CliError::LoadFailed {
        message: controller
            .master()
            .error_message()
            .map_or_else(|| controller.screen().master_fallback(), str::to_owned),
    }
}

fn ensure_loaded<D>(controller: &BrowserController<Instance, D>) -> Result<(), CliError>
where
    D: DependentItem,
{
    match controller.dependent().error_message() {
        Some(message) => Err(CliError::LoadFailed {
            message: message.to_owned(),
        }),
        None => Ok(()),
    }
}

// ── Page rendering ──────────────────────────────────────────────────

/// Structured-output shape of one page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView<'a, T> {
    page_num: u32,
    page_size: u32,
    total: u64,
    total_pages: u32,
    list: &'a [T],
}

/// Render the browser's current page; tables get a range footer.
pub fn render_page<D, R>(
    controller: &BrowserController<Instance, D>,
    format: OutputFormat,
    to_row: impl Fn(&D) -> R,
) -> Result<String, CliError>
where
    D: DependentItem + Serialize,
    R: Tabled,
{
    let window = controller.window();
    let list = controller.dependent().list();
    match format {
        OutputFormat::Table => {
            let table = output::render_list(format, list, to_row, |d| d.id().to_string())?;
            Ok(format!("{table}\n{}", output::page_footer(&window)))
        }
        OutputFormat::Plain => {
            output::render_list(format, list, to_row, |d| d.id().to_string())
        }
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            let view = PageView {
                page_num: window.page_num,
                page_size: window.page_size,
                total: window.total,
                total_pages: window.total_pages(),
                list,
            };
            output::render_single(format, &view, |_| String::new(), |_| String::new())
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Board")]
    board: i64,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Remark")]
    remark: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Terminal")]
    terminal: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Lat / Lon")]
    position: String,
}

fn text(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

fn device_row(
    controller: &BrowserController<Instance, Device>,
    d: &Device,
    color: bool,
) -> DeviceRow {
    DeviceRow {
        id: d.id,
        instance: controller.owner_label(d.instance_id),
        board: d.device,
        version: text(d.version.as_deref()),
        state: output::paint_state(d.state_or_unknown(), color),
        remark: text(d.remark.as_deref()),
        created: text(d.create_time.as_deref()),
    }
}

fn station_row(controller: &BrowserController<Instance, Station>, s: &Station) -> StationRow {
    StationRow {
        id: s.id,
        instance: controller.owner_label(s.instance_id),
        mac: text(s.mac.as_deref()),
        terminal: s.terminal_no.map_or_else(|| "-".into(), |n| n.to_string()),
        ip: text(s.ip.as_deref()),
        model: text(s.model.as_deref()),
        version: text(s.version.as_deref()),
        position: format!("{:.4} / {:.4}", s.modem_lat, s.modem_lon),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_devices(
    client: Arc<SimulatorClient>,
    session: &Session,
    args: DependentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DependentCommand::List(list) => {
            let screen = ScreenConfig::devices().with_page_size(session.page_size)?;
            let browser: PageBrowser<Device> = browse(client, screen, Target::from(&list)).await?;
            let controller = browser.controller();
            let color = output::should_color(global.color);
            let out = render_page(controller, global.output, |d| {
                device_row(controller, d, color)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

pub async fn handle_stations(
    client: Arc<SimulatorClient>,
    session: &Session,
    args: DependentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DependentCommand::List(list) => {
            let screen = ScreenConfig::stations().with_page_size(session.page_size)?;
            let browser: PageBrowser<Station> = browse(client, screen, Target::from(&list)).await?;
            let controller = browser.controller();
            let out = render_page(controller, global.output, |s| station_row(controller, s))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
