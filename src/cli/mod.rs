pub mod connectivity;

use serde_json::{json, Value};

use crate::routes::RouteDecision;

/// JSON form of a guard decision, shared by the local and remote CLI paths.
pub fn decision_json(path: &str, decision: RouteDecision) -> Value {
    match decision {
        RouteDecision::Render(view) => json!({"path": path, "decision": "render", "view": view, "title": view.title()}),
        RouteDecision::Redirect(to) => json!({"path": path, "decision": "redirect", "location": to}),
    }
}

// Render a nav payload (`{"items": [...], "active": ...}`) as an ASCII table.
// Returns false when there is nothing to draw.
pub fn print_nav(val: &Value) -> bool {
    let rows = nav_rows(val);
    if rows.is_empty() { return false; }
    for line in render_table(&["id", "label", "href", "active"], &rows) { println!("{}", line); }
    println!("rows: {}", rows.len());
    true
}

fn nav_rows(val: &Value) -> Vec<Vec<String>> {
    let active = val.get("active").and_then(|a| a.as_str()).unwrap_or("");
    let mut out = Vec::new();
    let Some(items) = val.get("items").and_then(|v| v.as_array()) else { return out; };
    for it in items {
        out.push(nav_row(it, "", active));
        if let Some(children) = it.get("children").and_then(|c| c.as_array()) {
            for c in children { out.push(nav_row(c, "  └ ", active)); }
        }
    }
    out
}

fn nav_row(v: &Value, indent: &str, active: &str) -> Vec<String> {
    let id = v.get("id").and_then(|x| x.as_str()).unwrap_or("");
    let label = v.get("label").and_then(|x| x.as_str()).unwrap_or("");
    let href = v.get("href").and_then(|x| x.as_str()).unwrap_or("(expand)");
    let mark = if !active.is_empty() && id == active { "*" } else { "" };
    vec![format!("{}{}", indent, id), label.to_string(), href.to_string(), mark.to_string()]
}

pub fn render_table(cols: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let max_col_width: usize = 48;
    let mut widths: Vec<usize> = cols.iter().map(|s| s.chars().count().min(max_col_width)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = cell.chars().count();
            if w > widths[i] { widths[i] = w.min(max_col_width); }
        }
    }
    let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
    let sep = build_separator(&widths);
    let mut out = vec![sep.clone(), build_row(&header, &widths), sep.clone()];
    for r in rows { out.push(build_row(r, &widths)); }
    out.push(sep);
    out
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&text);
        s.push_str(&" ".repeat(w.saturating_sub(text.chars().count())));
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::navigation::{self, Surface};
    use crate::routes::{View, NOT_FOUND_PATH};

    #[test]
    fn decision_json_shapes() {
        let v = decision_json("/home", RouteDecision::Render(View::Dashboard));
        assert_eq!(v["decision"], "render");
        assert_eq!(v["view"], "dashboard");
        let v = decision_json("/home", RouteDecision::Redirect(NOT_FOUND_PATH));
        assert_eq!(v["location"], NOT_FOUND_PATH);
    }

    #[test]
    fn table_lists_children_and_marks_active() {
        let items = navigation::filter(Some(Role::BusinessOwner), Surface::Desktop);
        let val = json!({"items": items, "active": "biznest-form"});
        let rows = nav_rows(&val);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], vec!["biznest-form", "Business", "/biznest/form", "*"]);
        assert_eq!(rows[2][2], "(expand)");
        assert_eq!(rows[3][0], "  └ settings-profile");
        let lines = render_table(&["id", "label", "href", "active"], &rows);
        assert_eq!(lines.len(), rows.len() + 4);
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
