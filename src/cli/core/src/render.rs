/* src/cli/core/src/render.rs */

// `mirror render` and `mirror check`: load the snapshot and its companions,
// run the patch pipeline, then write the document or report on it.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use mirror_engine::{
  Injections, ManifestCache, PatchFlags, PatchReport, RenderOptions, RenderedDocument, load_site_content,
  read_snapshot, render_document,
};

use crate::config::ResolvedInputs;
use crate::ui::{self, DIM, GREEN, RESET, YELLOW};

pub struct RenderRun {
  pub document: RenderedDocument,
  pub slot_rewrite: bool,
}

impl RenderRun {
  /// Strict mode rejects a snapshot in which slot patching found no section.
  fn check_strict(&self, strict: bool) -> Result<()> {
    if strict && self.slot_rewrite && self.document.report.is_stale() {
      bail!("no section container matched the snapshot (strict mode); re-capture it or update the markers");
    }
    Ok(())
  }
}

pub fn render_inputs(inputs: &ResolvedInputs) -> Result<RenderRun> {
  let snapshot = read_snapshot(&inputs.snapshot)?;
  let site = load_site_content(&inputs.content);
  let manifest = ManifestCache::load_or_refresh(&inputs.manifest, None)
    .with_context(|| format!("failed to load media manifest {}", inputs.manifest.display()))?;
  let injections = inputs.injections.as_deref().map(Injections::load).transpose()?;

  let options = RenderOptions {
    site: &site,
    media: &manifest.media,
    injections: injections.as_ref(),
    static_prefix_from: &inputs.static_prefix_from,
    static_prefix_to: &inputs.static_prefix_to,
  };
  let document = render_document(&snapshot, &options);
  Ok(RenderRun { document, slot_rewrite: PatchFlags::from_site(&site).slot_rewrite })
}

fn print_report(report: &PatchReport) {
  if report.matched_sections.is_empty() {
    ui::detail(&format!("{YELLOW}no sections matched{RESET}"));
  } else {
    ui::detail(&format!(
      "{} sections matched {DIM}({}){RESET}",
      report.matched_sections.len(),
      report.matched_sections.join(", ")
    ));
  }
  for warning in &report.warnings {
    ui::warn(warning);
  }
  let count = report.warnings.len();
  if count == 0 {
    ui::detail_ok("no slot warnings");
  } else {
    ui::detail(&format!("{YELLOW}{count}{RESET} slot warning{}", if count == 1 { "" } else { "s" }));
  }
}

fn write_output(html: &str, out: Option<&Path>) -> Result<()> {
  let Some(out) = out else {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(html.as_bytes()).context("failed to write document to stdout")?;
    return stdout.flush().context("failed to flush stdout");
  };
  if let Some(parent) = out.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  std::fs::write(out, html).with_context(|| format!("failed to write {}", out.display()))?;
  ui::detail_ok(&format!("{GREEN}{}{RESET} {DIM}({} bytes){RESET}", out.display(), html.len()));
  Ok(())
}

pub fn run_render(inputs: &ResolvedInputs) -> Result<()> {
  let started = Instant::now();
  ui::banner("render", Some(&inputs.snapshot.display().to_string()));

  ui::step(1, 2, "Patching snapshot");
  let run = render_inputs(inputs)?;
  print_report(&run.document.report);
  run.check_strict(inputs.strict)?;

  ui::step(2, 2, "Writing document");
  write_output(&run.document.html, inputs.out.as_deref())?;

  ui::blank();
  ui::detail(&format!("{DIM}done in {:.2}s{RESET}", started.elapsed().as_secs_f64()));
  Ok(())
}

/// Run the pipeline without writing. `json` prints the report to stdout
/// instead of the terminal summary.
pub fn run_check(inputs: &ResolvedInputs, json: bool) -> Result<()> {
  let run = render_inputs(inputs)?;
  if json {
    let text = serde_json::to_string_pretty(&run.document.report).context("failed to serialize report")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("failed to write report to stdout")?;
  } else {
    ui::banner("check", Some(&inputs.snapshot.display().to_string()));
    print_report(&run.document.report);
  }
  run.check_strict(inputs.strict)
}
