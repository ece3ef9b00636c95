//! Instance command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use cmsim_core::instances::{create_instance, fetch_instance, update_instance};
use cmsim_core::{
    Instance, InstanceDraft, LoadStatus, MasterItem, MasterListStore, ScreenConfig,
    SimulatorClient,
};

use crate::cli::{GlobalOpts, InstancesArgs, InstancesCommand, OutputFormat};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::dependents::{self, PageBrowser, Target};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Remark")]
    remark: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn row(inst: &Instance, color: bool) -> InstanceRow {
    InstanceRow {
        id: inst.id,
        ip: if inst.http_ip.is_empty() {
            "-".into()
        } else {
            inst.http_ip.clone()
        },
        port: inst.http_port.map_or_else(|| "-".into(), |p| p.to_string()),
        state: output::paint_enabled(inst.enabled(), color),
        remark: inst.remark.clone().unwrap_or_default(),
        created: inst.create_time.clone().unwrap_or_else(|| "-".into()),
    }
}

fn detail(inst: &Instance) -> String {
    [
        format!("ID:      {}", inst.id),
        format!("IP:      {}", inst.http_ip),
        format!(
            "Port:    {}",
            inst.http_port.map_or_else(|| "-".into(), |p| p.to_string())
        ),
        format!("Enabled: {}", inst.enable),
        format!("Remark:  {}", inst.remark.as_deref().unwrap_or("-")),
        format!("Created: {}", inst.create_time.as_deref().unwrap_or("-")),
        format!("Updated: {}", inst.update_time.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn print_instance(inst: &Instance, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, inst, detail, |i| i.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Optional edit flags folded over an existing instance.
struct Overrides {
    ip: Option<String>,
    port: Option<u16>,
    enable: Option<bool>,
    remark: Option<String>,
}

impl Overrides {
    fn apply(self, draft: &mut InstanceDraft) {
        if let Some(ip) = self.ip {
            draft.http_ip = ip;
        }
        if let Some(port) = self.port {
            draft.http_port = port;
        }
        if let Some(enable) = self.enable {
            draft.enable = enable;
        }
        if let Some(remark) = self.remark {
            draft.remark = (!remark.is_empty()).then_some(remark);
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    client: Arc<SimulatorClient>,
    session: &Session,
    args: InstancesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InstancesCommand::List { filter } => list(&client, filter.as_deref(), global).await,
        InstancesCommand::Page { page } => page_of(client, session, page, global).await,
        InstancesCommand::Get { id } => {
            let inst = fetch_instance(&client, id).await?;
            print_instance(&inst, global)
        }
        InstancesCommand::Add {
            ip,
            port,
            disabled,
            remark,
        } => {
            let draft = InstanceDraft {
                id: None,
                http_port: port,
                http_ip: ip,
                enable: !disabled,
                remark: remark.filter(|r| !r.is_empty()),
            };
            add(&client, &draft, global).await
        }
        InstancesCommand::Edit {
            id,
            ip,
            port,
            enable,
            disable,
            remark,
        } => {
            let overrides = Overrides {
                ip,
                port,
                enable: match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                remark,
            };
            edit(&client, id, overrides, global).await
        }
    }
}

async fn list(
    client: &SimulatorClient,
    filter: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let screen = ScreenConfig::instances();
    let mut store = MasterListStore::<Instance>::new();
    if store.load(client, &screen).await == LoadStatus::Failed {
        return Err(CliError::LoadFailed {
            message: store
                .error_message()
                .map_or_else(|| screen.master_fallback(), str::to_owned),
        });
    }

    let view = store.filtered_view(filter.unwrap_or(""));
    let items: Vec<Instance> = view.iter().map(|inst| (**inst).clone()).collect();
    let color = output::should_color(global.color);
    let mut out = output::render_list(
        global.output,
        &items,
        |inst| row(inst, color),
        |inst| inst.id.to_string(),
    )?;
    if global.output == OutputFormat::Table && filter.is_some() {
        let _ = write!(
            out,
            "\n{} of {} instances match",
            items.len(),
            store.items().len()
        );
    }
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn page_of(
    client: Arc<SimulatorClient>,
    session: &Session,
    page: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let screen = ScreenConfig::instances().with_page_size(session.page_size)?;
    let target = Target {
        instance: None,
        instance_ip: None,
        page,
    };
    let browser: PageBrowser<Instance> = dependents::browse(client, screen, target).await?;
    let color = output::should_color(global.color);
    let out = dependents::render_page(browser.controller(), global.output, |inst| {
        row(inst, color)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn add(
    client: &SimulatorClient,
    draft: &InstanceDraft,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let created = create_instance(client, draft).await?;
    if !global.quiet {
        eprintln!("Instance {}:{} added", draft.http_ip, draft.http_port);
    }
    match created {
        Some(inst) => print_instance(&inst, global),
        None => Ok(()),
    }
}

async fn edit(
    client: &SimulatorClient,
    id: i64,
    overrides: Overrides,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let current = fetch_instance(client, id).await?;
    let mut draft = InstanceDraft::from(&current);
    overrides.apply(&mut draft);

    let updated = update_instance(client, &draft).await?;
    if !global.quiet {
        eprintln!("Instance {id} updated");
    }
    match updated {
        Some(inst) => print_instance(&inst, global),
        None => Ok(()),
    }
}
