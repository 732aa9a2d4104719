//! `sentinel`: command-line dashboard for the Sentinel PPE registry.
//!
//! # Usage
//!
//! ```
//! sentinel register --company-name Acme --industry factory ...
//! sentinel login root@sentinel.io
//! sentinel companies --status pending
//! sentinel approve 6f1c...
//! sentinel --url http://registry:8000 overview
//! ```

mod client;
mod session;
mod views;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::ApiClient;
use sentinel_core::{
  analytics,
  camera::{CameraStatus, NewCamera},
  company::{CompanyProfile, CompanyStatus, Industry, Registration},
  employee::{ComplianceStatus, EmployeeBatch, NewEmployee},
  filter::{CameraFilter, Choice, CompanyFilter, EmployeeFilter, Filter as _, ViolationFilter},
  fixtures::{self, Dataset},
  identity::{Identity, Role},
  violation::{PpeKind, Severity},
};
use serde::{Deserialize, Serialize};
use session::{Session, require_login, require_role};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://127.0.0.1:8000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sentinel", about = "Command-line dashboard for the Sentinel PPE registry")]
struct Args {
  /// Path to a TOML config file (url, session, fixtures).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the registry (default: http://127.0.0.1:8000).
  #[arg(long, env = "SENTINEL_URL", global = true)]
  url: Option<String>,

  /// Where the login session is kept.
  #[arg(long, env = "SENTINEL_SESSION", global = true)]
  session: Option<PathBuf>,

  /// Dataset of violations and cameras; the bundled demo data is used
  /// until this file exists.
  #[arg(long, env = "SENTINEL_FIXTURES", global = true)]
  fixtures: Option<PathBuf>,

  /// Print JSON instead of tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Check that the registry is reachable.
  Health,
  /// Log in as the platform admin or a company admin.
  Login {
    /// Admin email.
    username: String,
    /// Read from stdin when omitted.
    #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// End the session, locally even if the registry is unreachable.
  Logout,
  /// Show the logged-in identity.
  Whoami,
  /// Submit a company registration for approval.
  Register(RegisterArgs),
  /// Show your company's registration record.
  Status,
  /// List pending and active companies (platform admin).
  Companies {
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    status: Choice<CompanyStatus>,
    /// Include rejected registrations.
    #[arg(long)]
    all: bool,
  },
  /// Approve a pending company (platform admin).
  Approve { id: Uuid },
  /// Reject a pending company (platform admin).
  Reject { id: Uuid },
  /// Show the decision log for a company (platform admin).
  Decisions { id: Uuid },
  /// Manage your company's employees.
  Employees {
    #[command(subcommand)]
    action: EmployeesCommand,
  },
  /// List PPE violations.
  Violations {
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    severity: Choice<Severity>,
    #[arg(long, default_value = "all")]
    ppe: Choice<PpeKind>,
  },
  /// List or switch cameras.
  Cameras {
    #[command(subcommand)]
    action: CamerasCommand,
  },
  /// Dashboard counts for the current role.
  Overview,
}

#[derive(ClapArgs, Debug)]
struct RegisterArgs {
  #[arg(long)]
  company_name:  String,
  #[arg(long)]
  industry:      Industry,
  #[arg(long)]
  company_email: String,
  #[arg(long)]
  reg_no:        String,
  #[arg(long)]
  admin_name:    String,
  #[arg(long)]
  admin_email:   String,
  #[arg(long)]
  contact:       String,
  /// Read from stdin when omitted.
  #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
  password:      Option<String>,
}

#[derive(Subcommand, Debug)]
enum EmployeesCommand {
  List {
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    status: Choice<ComplianceStatus>,
  },
  /// Import a JSON file: `{"employees":[...]}` or a bare array of rows.
  Import { file: PathBuf },
  Remove { employee_id: String },
}

#[derive(Subcommand, Debug)]
enum CamerasCommand {
  List {
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    status: Choice<CameraStatus>,
  },
  /// Switch a camera on or off (company admin).
  Toggle { camera_id: String },
  /// Add a camera to your company (company admin).
  Add {
    #[arg(long)]
    name:          String,
    #[arg(long)]
    location:      String,
    #[arg(long)]
    stream_source: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      Option<String>,
  #[serde(default)]
  session:  Option<PathBuf>,
  #[serde(default)]
  fixtures: Option<PathBuf>,
}

/// Settings after merging flags, environment, config file and defaults.
#[derive(Debug)]
struct Settings {
  url:      String,
  session:  PathBuf,
  fixtures: PathBuf,
  json:     bool,
}

fn config_dir() -> PathBuf {
  std::env::var_os("HOME")
    .map(|home| PathBuf::from(home).join(".config").join("sentinel"))
    .unwrap_or_else(|| PathBuf::from(".sentinel"))
}

impl Settings {
  fn resolve(args: &Args) -> Result<Self> {
    let file_cfg: ConfigFile = if let Some(path) = &args.config {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
      toml::from_str(&raw).context("parsing config file")?
    } else {
      ConfigFile::default()
    };

    // Flags and environment override the config file, which overrides defaults.
    Ok(Self {
      url:      args
        .url
        .clone()
        .or(file_cfg.url)
        .unwrap_or_else(|| DEFAULT_URL.to_string()),
      session:  args
        .session
        .clone()
        .or(file_cfg.session)
        .unwrap_or_else(|| config_dir().join("session.json")),
      fixtures: args
        .fixtures
        .clone()
        .or(file_cfg.fixtures)
        .unwrap_or_else(|| config_dir().join("fixtures.json")),
      json:     args.json,
    })
  }

  fn client(&self, session: Option<&Session>) -> Result<ApiClient> {
    let client = ApiClient::new(&self.url).context("failed to build HTTP client")?;
    Ok(match session {
      Some(s) => client.with_token(&s.token),
      None => client,
    })
  }

  /// The violation and camera dataset: the fixtures file if it exists,
  /// otherwise the bundled demo data.
  fn dataset(&self) -> Result<Dataset> {
    let path = &self.fixtures;
    if !path.exists() {
      return fixtures::demo().context("loading demo dataset");
    }
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading fixtures {}", path.display()))?;
    Dataset::from_json(&raw).with_context(|| format!("parsing fixtures {}", path.display()))
  }

  fn save_dataset(&self, data: &Dataset) -> Result<PathBuf> {
    let path = self.fixtures.clone();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, raw).with_context(|| format!("writing fixtures {}", path.display()))?;
    Ok(path)
  }

  fn print<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      println!("{}", text());
    }
    Ok(())
  }
}

/// Records visible to `identity`: everything for the platform admin, one
/// company's share otherwise.
fn scoped(data: Dataset, identity: &Identity) -> Dataset {
  match identity.reg_no() {
    Some(reg_no) => data.for_company(reg_no),
    None => data,
  }
}

/// Read a password from stdin.
fn read_password() -> Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn read_rows(path: &Path) -> Result<Vec<NewEmployee>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  if let Ok(batch) = serde_json::from_str::<EmployeeBatch>(&raw) {
    return Ok(batch.employees);
  }
  serde_json::from_str(&raw).with_context(|| format!("parsing employee rows in {}", path.display()))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let settings = Settings::resolve(&args)?;
  let session = load_session(&args.command, &settings.session)?;
  run(args.command, &settings, session.as_ref()).await
}

/// Load the saved session. `login` and `logout` overwrite or remove the
/// file, so for them an unreadable file counts as no session.
fn load_session(command: &Command, path: &Path) -> Result<Option<Session>> {
  match Session::load(path) {
    Ok(session) => Ok(session),
    Err(e) if matches!(command, Command::Login { .. } | Command::Logout) => {
      let detail = format!("{e:#}");
      tracing::warn!(error = %detail, "ignoring unreadable session file");
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

async fn run(command: Command, settings: &Settings, session: Option<&Session>) -> Result<()> {
  match command {
    Command::Health => {
      let health = settings.client(None)?.health().await?;
      println!("{} ({})", health.status, settings.url);
    }

    Command::Login { username, password } => {
      let password = match password {
        Some(p) => p,
        None => read_password()?,
      };
      let resp = settings.client(None)?.login(&username, &password).await?;
      let session = Session { token: resp.token, identity: resp.identity };
      session.save(&settings.session)?;
      let id = &session.identity;
      println!("{}: {} <{}> ({})", resp.message, id.name, id.email, id.role);
    }

    Command::Logout => {
      if let Some(s) = session
        && let Err(e) = settings.client(Some(s))?.logout().await
      {
        tracing::warn!(error = %e, "server-side logout failed; clearing local session anyway");
      }
      Session::clear(&settings.session)?;
      println!("Logged out");
    }

    Command::Whoami => {
      let s = require_login(session)?;
      let id = &s.identity;
      settings.print(id, || match &id.company {
        Some(c) => format!("{} <{}> ({}) for {} [{}]", id.name, id.email, id.role, c.company_name, c.reg_no),
        None => format!("{} <{}> ({})", id.name, id.email, id.role),
      })?;
    }

    Command::Register(reg) => {
      let password = match reg.password {
        Some(p) => p,
        None => read_password()?,
      };
      let registration = Registration {
        profile: CompanyProfile {
          company_name:  reg.company_name,
          industry_type: reg.industry,
          company_email: reg.company_email,
          reg_no:        reg.reg_no,
          admin_name:    reg.admin_name,
          admin_email:   reg.admin_email,
          contact:       reg.contact,
        },
        password,
      };
      let resp = settings.client(None)?.register(&registration).await?;
      settings.print(&resp.company, || format!("{}\n{}", resp.message, views::company(&resp.company)))?;
    }

    Command::Status => {
      let s = require_role(session, Role::CompanyAdmin)?;
      let company = settings.client(Some(s))?.own_status().await?;
      settings.print(&company, || views::company(&company))?;
    }

    Command::Companies { search, status, all } => {
      let s = require_role(session, Role::PlatformAdmin)?;
      let client = settings.client(Some(s))?;
      let companies = if all || status == Choice::Only(CompanyStatus::Rejected) {
        client.all_companies(None).await?
      } else {
        client.platform_companies().await?
      };
      let hits = CompanyFilter { search, status }.apply(&companies);
      settings.print(&hits, || views::companies(&hits))?;
    }

    Command::Approve { id } => {
      let s = require_role(session, Role::PlatformAdmin)?;
      let resp = settings.client(Some(s))?.approve(id).await?;
      settings.print(&resp.company, || format!("{}\n{}", resp.message, views::company(&resp.company)))?;
    }

    Command::Reject { id } => {
      let s = require_role(session, Role::PlatformAdmin)?;
      let resp = settings.client(Some(s))?.reject(id).await?;
      settings.print(&resp.company, || format!("{}\n{}", resp.message, views::company(&resp.company)))?;
    }

    Command::Decisions { id } => {
      let s = require_role(session, Role::PlatformAdmin)?;
      let log = settings.client(Some(s))?.decisions(id).await?;
      settings.print(&log, || views::decisions(&log))?;
    }

    Command::Employees { action } => {
      let s = require_role(session, Role::CompanyAdmin)?;
      let client = settings.client(Some(s))?;
      match action {
        EmployeesCommand::List { search, status } => {
          let employees = client.list_employees().await?;
          let hits = EmployeeFilter { search, status }.apply(&employees);
          settings.print(&hits, || views::employees(&hits))?;
        }
        EmployeesCommand::Import { file } => {
          let rows = read_rows(&file)?;
          let outcome = client.bulk_create(rows).await?;
          settings.print(&outcome, || views::bulk_outcome(&outcome))?;
        }
        EmployeesCommand::Remove { employee_id } => {
          client.remove_employee(&employee_id).await?;
          println!("Removed employee {employee_id}");
        }
      }
    }

    Command::Violations { search, severity, ppe } => {
      let s = require_login(session)?;
      let data = scoped(settings.dataset()?, &s.identity);
      let hits = ViolationFilter { search, severity, ppe }.apply(&data.violations);
      settings.print(&hits, || views::violations(&hits))?;
    }

    Command::Cameras { action: CamerasCommand::List { search, status } } => {
      let s = require_login(session)?;
      let data = scoped(settings.dataset()?, &s.identity);
      let hits = CameraFilter { search, status }.apply(&data.cameras);
      settings.print(&hits, || views::cameras(&hits))?;
    }

    Command::Cameras { action: CamerasCommand::Toggle { camera_id } } => {
      let s = require_role(session, Role::CompanyAdmin)?;
      let reg_no = s.identity.reg_no().unwrap_or_default().to_owned();
      let mut data = settings.dataset()?;
      let camera = data
        .cameras
        .iter_mut()
        .find(|c| c.camera_id == camera_id && c.company_reg_no == reg_no)
        .ok_or_else(|| anyhow!("camera {camera_id} not found for {reg_no}"))?;
      camera.toggle();
      let (name, status) = (camera.name.clone(), camera.status);
      let path = settings.save_dataset(&data)?;
      tracing::info!(camera = %camera_id, %status, path = %path.display(), "camera toggled");
      println!("{name} is now {status}");
    }

    Command::Cameras { action: CamerasCommand::Add { name, location, stream_source } } => {
      let s = require_role(session, Role::CompanyAdmin)?;
      let reg_no = s.identity.reg_no().unwrap_or_default().to_owned();
      let mut data = settings.dataset()?;
      let camera = data
        .add_camera(NewCamera { name, location, stream_source }, &reg_no, Utc::now())?
        .clone();
      let path = settings.save_dataset(&data)?;
      tracing::info!(camera = %camera.camera_id, path = %path.display(), "camera added");
      settings.print(&camera, || {
        format!("{} has been added as {} ({})", camera.name, camera.camera_id, camera.status)
      })?;
    }

    Command::Overview => {
      let s = require_login(session)?;
      let client = settings.client(Some(s))?;
      let now = Utc::now();
      match s.identity.role {
        Role::PlatformAdmin => {
          let companies = client.platform_companies().await?;
          let data = settings.dataset()?;
          let summary = analytics::summarize_platform(&companies, &data.violations, now);
          settings.print(&summary, || views::platform_overview(&summary))?;
        }
        Role::CompanyAdmin => {
          let employees = client.list_employees().await?;
          let data = scoped(settings.dataset()?, &s.identity);
          let e = analytics::summarize_employees(&employees);
          let v = analytics::summarize_violations(&data.violations, now);
          let c = analytics::summarize_cameras(&data.cameras);
          let value = serde_json::json!({ "employees": e, "violations": v, "cameras": c });
          settings.print(&value, || views::company_overview(&e, &v, &c))?;
        }
      }
    }
  }
  Ok(())
}
