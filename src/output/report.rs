//! Report files written by the dump and tree commands

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};

use crate::directory::tree::{flatten, DepartmentNode};
use crate::error::{OrgError, Result};

use super::common::{csv_line, CsvRecord};
use super::tree::TreeLabel;

/// `dir/stem.ext`, or `dir/stem_YYYY_MM_DD_HH_MM_SS.ext` when that file already exists
pub fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let path = dir.join(format!("{}.{}", stem, ext));
    if !path.exists() {
        return path;
    }
    let stamp = Local::now().format("%Y_%m_%d_%H_%M_%S");
    dir.join(format!("{}_{}.{}", stem, stamp, ext))
}

fn write_file(dir: &Path, stem: &str, ext: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        OrgError::Io(format!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    let path = unique_path(dir, stem, ext);
    fs::write(&path, content)
        .map_err(|e| OrgError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body { font-family: sans-serif; font-size: 14px; }
ul { list-style: none; padding-left: 1.4em; }
details > summary { cursor: pointer; }
.user { color: #555; }
.meta { color: #888; font-size: 12px; }
</style>
</head>
<body>
<h2>{title}</h2>
<p class="meta">{summary}</p>
<button onclick="document.querySelectorAll('details').forEach(d => d.open = true)">Expand all</button>
<button onclick="document.querySelectorAll('details').forEach(d => d.open = false)">Collapse all</button>
<ul>
"#;

const HTML_TAIL: &str = "</ul>\n</body>\n</html>\n";

fn html_node<D, U>(node: &DepartmentNode<D, U>, out: &mut String)
where
    D: TreeLabel,
    U: TreeLabel,
{
    let mut label = escape_html(&node.department.tree_label());
    if !node.leader_name.is_empty() {
        label.push_str(&format!(
            " <span class=\"meta\">leader: {}</span>",
            escape_html(&node.leader_name)
        ));
    }

    if node.users.is_empty() && node.children.is_empty() {
        out.push_str(&format!("<li>{}</li>\n", label));
        return;
    }

    out.push_str(&format!("<li><details open><summary>{}</summary>\n<ul>\n", label));
    for user in &node.users {
        out.push_str(&format!(
            "<li class=\"user\">👤 {}</li>\n",
            escape_html(&user.tree_label())
        ));
    }
    for child in &node.children {
        html_node(child, out);
    }
    out.push_str("</ul>\n</details></li>\n");
}

/// Render a collapsible HTML page for `forest`
pub fn render_html<D, U>(title: &str, forest: &[DepartmentNode<D, U>]) -> String
where
    D: TreeLabel,
    U: TreeLabel,
{
    let departments = crate::directory::tree::count_departments(forest);
    let users = crate::directory::tree::count_users(forest);
    let summary = format!(
        "{} departments, {} user entries, generated {}",
        departments,
        users,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut out = HTML_HEAD
        .replace("{title}", &escape_html(title))
        .replace("{summary}", &summary);
    for root in forest {
        html_node(root, &mut out);
    }
    out.push_str(HTML_TAIL);
    out
}

/// Write `forest` as `stem.html` under `dir`
pub fn write_html_report<D, U>(
    dir: &Path,
    stem: &str,
    title: &str,
    forest: &[DepartmentNode<D, U>],
) -> Result<PathBuf>
where
    D: TreeLabel,
    U: TreeLabel,
{
    debug!("Rendering HTML report '{}'", stem);
    write_file(dir, stem, "html", &render_html(title, forest))
}

/// One CSV row per attached user, prefixed with its department and parent
pub fn render_dump_csv<D, U>(forest: &[DepartmentNode<D, U>]) -> String
where
    D: TreeLabel,
    U: CsvRecord,
{
    let mut header = vec!["DEPARTMENT", "PARENT DEPARTMENT"];
    header.extend_from_slice(U::csv_header());

    let mut out = header.join(",");
    out.push('\n');
    for (_, node) in flatten(forest) {
        let department = node.department.tree_label();
        for user in &node.users {
            let mut fields = vec![department.clone(), node.parent_name.clone()];
            fields.extend(user.csv_fields());
            out.push_str(&csv_line(&fields));
            out.push('\n');
        }
    }
    out
}

/// Write the per-user CSV for `forest` as `stem.csv` under `dir`
pub fn write_dump_csv<D, U>(dir: &Path, stem: &str, forest: &[DepartmentNode<D, U>]) -> Result<PathBuf>
where
    D: TreeLabel,
    U: CsvRecord,
{
    write_file(dir, stem, "csv", &render_dump_csv(forest))
}

/// Write a flat list of records as `stem.csv` under `dir`
pub fn write_csv<R: CsvRecord>(dir: &Path, stem: &str, records: &[R]) -> Result<PathBuf> {
    let mut out = R::csv_header().join(",");
    out.push('\n');
    for record in records {
        out.push_str(&csv_line(&record.csv_fields()));
        out.push('\n');
    }
    write_file(dir, stem, "csv", &out)
}
