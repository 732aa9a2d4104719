//! Plain-text rendering of lists and summaries.

use std::fmt::Write as _;

use sentinel_core::{
  analytics::{CameraSummary, EmployeeSummary, PlatformSummary, ViolationSummary},
  camera::Camera,
  company::Company,
  employee::{BulkOutcome, Employee},
  lifecycle::DecisionRecord,
  violation::Violation,
};

const TIME_FMT: &str = "%Y-%m-%d %H:%M";

pub fn companies(list: &[&Company]) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{:<36}  {:<24}  {:<12}  {:<8}  {}", "ID", "NAME", "REG NO", "STATUS", "ADMIN");
  for c in list {
    let _ = writeln!(
      out,
      "{:<36}  {:<24}  {:<12}  {:<8}  {}",
      c.id, c.profile.company_name, c.profile.reg_no, c.status, c.profile.admin_email
    );
  }
  let _ = write!(out, "{} compan{}", list.len(), if list.len() == 1 { "y" } else { "ies" });
  out
}

pub fn company(c: &Company) -> String {
  let mut out = String::new();
  let p = &c.profile;
  let _ = writeln!(out, "{} ({})", p.company_name, p.reg_no);
  let _ = writeln!(out, "  id:        {}", c.id);
  let _ = writeln!(out, "  status:    {}", c.status);
  let _ = writeln!(out, "  industry:  {}", p.industry_type);
  let _ = writeln!(out, "  email:     {}", p.company_email);
  let _ = writeln!(out, "  admin:     {} <{}>", p.admin_name, p.admin_email);
  let _ = writeln!(out, "  contact:   {}", p.contact);
  let _ = write!(out, "  submitted: {}", c.created_at.format(TIME_FMT));
  if let (Some(at), Some(by)) = (c.decided_at, &c.decided_by) {
    let _ = write!(out, "\n  decided:   {} by {by}", at.format(TIME_FMT));
  }
  out
}

pub fn decisions(list: &[DecisionRecord]) -> String {
  if list.is_empty() {
    return "no decisions recorded".to_string();
  }
  let mut out = String::new();
  for d in list {
    let _ = writeln!(
      out,
      "{}  {:<7}  {} -> {}  by {}",
      d.recorded_at.format(TIME_FMT),
      d.decision,
      d.from,
      d.to,
      d.actor
    );
  }
  out.trim_end().to_string()
}

pub fn employees(list: &[&Employee]) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{:<10}  {:<20}  {:<18}  {}", "ID", "NAME", "DEPARTMENT", "COMPLIANCE");
  for e in list {
    let _ = writeln!(
      out,
      "{:<10}  {:<20}  {:<18}  {}",
      e.employee_id, e.name, e.department, e.compliance_status
    );
  }
  let _ = write!(out, "{} employee(s)", list.len());
  out
}

pub fn bulk_outcome(outcome: &BulkOutcome) -> String {
  let mut out = format!(
    "{}: {} inserted, {} skipped",
    outcome.message, outcome.inserted, outcome.skipped
  );
  for line in &outcome.errors {
    let _ = write!(out, "\n  {line}");
  }
  out
}

pub fn violations(list: &[&Violation]) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<16}  {:<8}  {:<18}  {:<22}  {:<6}  {}",
    "TIME", "EMPLOYEE", "NAME", "LOCATION", "SEV", "MISSING"
  );
  for v in list {
    let missing: Vec<&str> = v.missing_ppe.iter().map(AsRef::<str>::as_ref).collect();
    let _ = writeln!(
      out,
      "{:<16}  {:<8}  {:<18}  {:<22}  {:<6}  {}",
      v.timestamp.format(TIME_FMT),
      v.employee_id,
      v.employee_name,
      v.camera_location,
      v.severity,
      missing.join(", ")
    );
  }
  let _ = write!(out, "{} violation(s)", list.len());
  out
}

pub fn cameras(list: &[&Camera]) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{:<8}  {:<12}  {:<22}  {:<11}  {}", "ID", "NAME", "LOCATION", "STATUS", "SOURCE");
  for c in list {
    let _ = writeln!(
      out,
      "{:<8}  {:<12}  {:<22}  {:<11}  {}",
      c.camera_id, c.name, c.location, c.status, c.stream_source
    );
  }
  let _ = write!(out, "{} camera(s)", list.len());
  out
}

// ─── Summaries ───────────────────────────────────────────────────────────────

fn violation_lines(out: &mut String, v: &ViolationSummary) {
  let _ = writeln!(
    out,
    "violations:  {} total, {} today (high {}, medium {}, low {})",
    v.total, v.today, v.high, v.medium, v.low
  );
  if !v.by_ppe.is_empty() {
    let parts: Vec<_> = v.by_ppe.iter().map(|(k, n)| format!("{k} {n}")).collect();
    let _ = writeln!(out, "missing PPE: {}", parts.join(", "));
  }
}

pub fn company_overview(
  employees: &EmployeeSummary,
  violations: &ViolationSummary,
  cameras: &CameraSummary,
) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "employees:   {} total, {} compliant, {} non-compliant, {} unknown ({:.1}% compliant)",
    employees.total,
    employees.compliant,
    employees.non_compliant,
    employees.unknown,
    employees.compliance_rate
  );
  violation_lines(&mut out, violations);
  let _ = write!(
    out,
    "cameras:     {} total, {} active, {} inactive, {} maintenance",
    cameras.total, cameras.active, cameras.inactive, cameras.maintenance
  );
  out
}

pub fn platform_overview(summary: &PlatformSummary) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "companies:   {} total, {} active, {} pending",
    summary.total_companies, summary.active_companies, summary.pending_companies
  );
  violation_lines(&mut out, &summary.violations);
  if !summary.by_company.is_empty() {
    let _ = writeln!(out, "by company:");
    for (company, n) in &summary.by_company {
      let _ = writeln!(out, "  {company:<24}  {n}");
    }
  }
  out.trim_end().to_string()
}
