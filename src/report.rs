//! Static renderings of a [`Snapshot`].

use std::fmt::Write;

use clap::ValueEnum;
use serde::Deserialize;

use crate::format::{bytes_to_gib, format_uptime, or_unavailable};
use crate::system::classify::Tier;
use crate::system::files::{FileCategory, FileSummary};
use crate::system::host::HostInfo;
use crate::system::process::ProcessSample;
use crate::system::resources::{CpuInfo, MemoryInfo};
use crate::system::snapshot::{Section, Snapshot};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Html,
    Json,
}

impl ReportFormat {
    pub fn render(self, snapshot: &Snapshot) -> serde_json::Result<String> {
        match self {
            ReportFormat::Markdown => Ok(render_markdown(snapshot)),
            ReportFormat::Html => Ok(render_html(snapshot)),
            ReportFormat::Json => render_json(snapshot),
        }
    }
}

pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

pub fn render_markdown(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Host health report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- Captured: `{}`",
        snapshot.timestamp.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "## Host");
    let _ = writeln!(out);
    match &snapshot.host {
        Section::Available(host) => {
            for (label, value) in host_facts(host) {
                let _ = writeln!(out, "- {label}: {value}");
            }
        }
        Section::Unavailable(err) => {
            let _ = writeln!(out, "_Unavailable: {err}_");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## CPU");
    let _ = writeln!(out);
    match &snapshot.cpu {
        Section::Available(cpu) => markdown_cpu(&mut out, cpu),
        Section::Unavailable(err) => {
            let _ = writeln!(out, "_Unavailable: {err}_");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Memory");
    let _ = writeln!(out);
    match &snapshot.memory {
        Section::Available(mem) => {
            let _ = writeln!(
                out,
                "- Used: {} GB of {} GB ({}%, {})",
                mem.used_gib(),
                mem.total_gib(),
                mem.usage_percent,
                mem.tier.color_name()
            );
        }
        Section::Unavailable(err) => {
            let _ = writeln!(out, "_Unavailable: {err}_");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Top processes");
    let _ = writeln!(out);
    match &snapshot.top_processes {
        Section::Available(procs) if procs.is_empty() => {
            let _ = writeln!(out, "_No active processes._");
        }
        Section::Available(procs) => markdown_processes(&mut out, procs),
        Section::Unavailable(err) => {
            let _ = writeln!(out, "_Unavailable: {err}_");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Files");
    let _ = writeln!(out);
    match &snapshot.files {
        Section::Available(files) => markdown_files(&mut out, files),
        Section::Unavailable(err) => {
            let _ = writeln!(out, "_Unavailable: {err}_");
        }
    }

    out
}

fn markdown_cpu(out: &mut String, cpu: &CpuInfo) {
    let _ = writeln!(out, "- Cores: {}", cpu.core_count);
    let _ = writeln!(
        out,
        "- Frequency: {}",
        or_unavailable(cpu.frequency_mhz.map(|f| format!("{f} MHz")))
    );
    let _ = writeln!(
        out,
        "- Usage: {}% ({})",
        cpu.usage_percent,
        cpu.tier.color_name()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| Core | Usage | Level |");
    let _ = writeln!(out, "| ---: | ---: | --- |");
    for core in &cpu.per_core {
        let _ = writeln!(
            out,
            "| {} | {}% | {} |",
            core.index,
            core.usage_percent,
            core.tier.color_name()
        );
    }
}

fn markdown_processes(out: &mut String, procs: &[ProcessSample]) {
    let _ = writeln!(out, "| PID | Name | CPU | RAM |");
    let _ = writeln!(out, "| ---: | --- | ---: | ---: |");
    for p in procs {
        let _ = writeln!(
            out,
            "| {} | {} | {}% | {}% |",
            p.pid,
            p.name.replace('|', "\\|"),
            p.cpu_percent,
            p.mem_percent
        );
    }
}

fn markdown_files(out: &mut String, files: &FileSummary) {
    let root = files.scan_root().display();
    let _ = writeln!(out, "- Scan root: `{root}` (recursive)");
    let _ = writeln!(out, "- Files scanned: {}", files.total_files());
    let _ = writeln!(out, "- Tracked extensions: {}", FileCategory::TRACKED);
    if files.skipped_entries() > 0 {
        let _ = writeln!(out, "- Skipped entries: {}", files.skipped_entries());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "| Extension | Count | Share | Size |");
    let _ = writeln!(out, "| --- | ---: | ---: | ---: |");
    for row in files.non_empty_rows() {
        let _ = writeln!(
            out,
            "| {} | {} | {}% | {} GB |",
            row.category.label(),
            row.count,
            row.percent_of_total_files,
            bytes_to_gib(row.total_bytes)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "### Largest files");
    let _ = writeln!(out);
    if files.largest_files().is_empty() {
        let _ = writeln!(out, "_No files found._");
    }
    for (i, file) in files.largest_files().iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. **{}** ({} GB)",
            i + 1,
            file.display_name,
            bytes_to_gib(file.size_bytes)
        );
    }
}

fn host_facts(host: &HostInfo) -> Vec<(&'static str, String)> {
    let uptime = match (host.uptime_clamped, host.boot_time) {
        (true, None) => crate::format::UNAVAILABLE.to_string(),
        (true, Some(_)) => format!("{} (clock skew)", format_uptime(host.uptime)),
        (false, _) => format_uptime(host.uptime),
    };
    let load = match &host.load {
        Some(load) => format!("{}% / {}% / {}%", load.one, load.five, load.fifteen),
        None => crate::format::UNAVAILABLE.to_string(),
    };
    vec![
        ("Hostname", or_unavailable(host.hostname.as_deref())),
        ("OS", or_unavailable(host.os_long.as_deref().or(host.os.as_deref()))),
        (
            "Boot time",
            or_unavailable(host.boot_time.map(|t| t.format(TIMESTAMP_FORMAT))),
        ),
        ("Uptime", uptime),
        ("Users", or_unavailable(host.user_count)),
        ("IP address", or_unavailable(host.ip_address)),
        ("Load 1/5/15 min", load),
    ]
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn level_class(tier: Tier) -> String {
    format!("usage-level-{}", tier.color_name())
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;background:#f7f7f7}\
section{background:#fff;border-radius:6px;padding:1rem;margin-bottom:1rem}\
table{border-collapse:collapse}td,th{padding:.25rem .75rem;text-align:left}\
.usage-level-green{color:#2d7a27}.usage-level-orange{color:#b5590a}\
.usage-level-red{color:#a12e2e}.unavailable{color:#888;font-style:italic}";

pub fn render_html(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let captured = snapshot.timestamp.format(TIMESTAMP_FORMAT).to_string();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>Host health report</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>Host health report</h1>");
    let _ = writeln!(out, "<p>Captured: <time>{captured}</time></p>");

    let _ = writeln!(out, "<section id=\"host\"><h2>Host</h2>");
    match &snapshot.host {
        Section::Available(host) => {
            let _ = writeln!(out, "<ul>");
            for (label, value) in host_facts(host) {
                let _ = writeln!(
                    out,
                    "<li>{}: <strong>{}</strong></li>",
                    label,
                    escape_html(&value)
                );
            }
            let _ = writeln!(out, "</ul>");
        }
        Section::Unavailable(err) => html_unavailable(&mut out, &err.to_string()),
    }
    let _ = writeln!(out, "</section>");

    let _ = writeln!(out, "<section id=\"cpu\"><h2>CPU</h2>");
    match &snapshot.cpu {
        Section::Available(cpu) => html_cpu(&mut out, cpu),
        Section::Unavailable(err) => html_unavailable(&mut out, &err.to_string()),
    }
    let _ = writeln!(out, "</section>");

    let _ = writeln!(out, "<section id=\"memory\"><h2>Memory</h2>");
    match &snapshot.memory {
        Section::Available(mem) => html_memory(&mut out, mem),
        Section::Unavailable(err) => html_unavailable(&mut out, &err.to_string()),
    }
    let _ = writeln!(out, "</section>");

    let _ = writeln!(out, "<section id=\"processes\"><h2>Top processes</h2>");
    match &snapshot.top_processes {
        Section::Available(procs) => html_processes(&mut out, procs),
        Section::Unavailable(err) => html_unavailable(&mut out, &err.to_string()),
    }
    let _ = writeln!(out, "</section>");

    let _ = writeln!(out, "<section id=\"files\"><h2>Files</h2>");
    match &snapshot.files {
        Section::Available(files) => html_files(&mut out, files),
        Section::Unavailable(err) => html_unavailable(&mut out, &err.to_string()),
    }
    let _ = writeln!(out, "</section>");

    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

fn html_unavailable(out: &mut String, reason: &str) {
    let _ = writeln!(
        out,
        "<p class=\"unavailable\">Unavailable: {}</p>",
        escape_html(reason)
    );
}

fn html_cpu(out: &mut String, cpu: &CpuInfo) {
    let freq = or_unavailable(cpu.frequency_mhz.map(|f| format!("{f} MHz")));
    let _ = writeln!(
        out,
        "<p>Cores: {} &middot; Frequency: {}</p>",
        cpu.core_count, freq
    );
    let _ = writeln!(
        out,
        "<p>Usage: <span class=\"{}\">{}%</span></p>",
        level_class(cpu.tier),
        cpu.usage_percent
    );
    for core in &cpu.per_core {
        let _ = writeln!(
            out,
            "<p>Core {i}: <span role=\"progressbar\" aria-valuenow=\"{v}\" aria-valuemin=\"0\" aria-valuemax=\"100\" aria-label=\"Core {i} usage\" class=\"{c}\">{v}%</span></p>",
            i = core.index,
            v = core.usage_percent,
            c = level_class(core.tier)
        );
    }
}

fn html_memory(out: &mut String, mem: &MemoryInfo) {
    let _ = writeln!(
        out,
        "<p>Used: {} GB of {} GB <span class=\"{}\">({}%)</span></p>",
        mem.used_gib(),
        mem.total_gib(),
        level_class(mem.tier),
        mem.usage_percent
    );
}

fn html_processes(out: &mut String, procs: &[ProcessSample]) {
    if procs.is_empty() {
        let _ = writeln!(out, "<p>No active processes.</p>");
        return;
    }
    let _ = writeln!(out, "<table>");
    let _ = writeln!(
        out,
        "<tr><th>PID</th><th>Name</th><th>CPU</th><th>RAM</th></tr>"
    );
    for p in procs {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}%</td><td class=\"{}\">{}%</td></tr>",
            p.pid,
            escape_html(&p.name),
            level_class(p.cpu_tier),
            p.cpu_percent,
            level_class(p.mem_tier),
            p.mem_percent
        );
    }
    let _ = writeln!(out, "</table>");
}

fn html_files(out: &mut String, files: &FileSummary) {
    let _ = writeln!(
        out,
        "<p>Scan root: <code>{}</code> (recursive) &middot; Files scanned: {} &middot; Tracked extensions: {}</p>",
        escape_html(&files.scan_root().display().to_string()),
        files.total_files(),
        FileCategory::TRACKED
    );
    if files.skipped_entries() > 0 {
        let _ = writeln!(out, "<p>Skipped entries: {}</p>", files.skipped_entries());
    }
    let _ = writeln!(out, "<table>");
    let _ = writeln!(
        out,
        "<tr><th>Extension</th><th>Count</th><th>Share</th><th>Size</th></tr>"
    );
    for row in files.non_empty_rows() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}%</td><td>{} GB</td></tr>",
            row.category.label(),
            row.count,
            row.percent_of_total_files,
            bytes_to_gib(row.total_bytes)
        );
    }
    let _ = writeln!(out, "</table>");
    let _ = writeln!(out, "<h3>Largest files</h3>");
    for (i, file) in files.largest_files().iter().enumerate() {
        let _ = writeln!(
            out,
            "<p>{}. <strong>{}</strong> ({} GB)</p>",
            i + 1,
            escape_html(&file.display_name),
            bytes_to_gib(file.size_bytes)
        );
    }
}
