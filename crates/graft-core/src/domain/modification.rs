//! Anchor-based splicing of aliased files.
//!
//! A modification resolves its alias, then:
//!
//! 1. wraps a region: `open_tag` goes immediately before the first match of
//!    `add_before_match`, `close_tag` immediately after the first match of
//!    `add_after_match` found at or after the before-anchor
//! 2. inserts every import statement not already present verbatim, after
//!    the file's last import (or after a leading `"use client"` style
//!    directive, or at the top)
//!
//! Both steps run against a copy. The tree is only patched once everything
//! succeeded, so a missing anchor never leaves a half-applied file.
//!
//! Applying the same spec twice is a no-op: a wrap whose tags already
//! enclose the anchors as a pair, and imports already in the file, are
//! skipped. Because later plugins anchor on the literal tags of earlier ones,
//! their wraps nest outside: `<B><A>{children}</A></B>`.

use crate::domain::{
    entities::{file_tree::FileTree, plugin::ModificationSpec},
    error::DomainError,
    value_objects::{LogicalFileAlias, PluginId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationOutcome {
    /// The file was patched.
    Applied,
    /// Every part of the spec was already present; the file is untouched.
    AlreadyApplied,
    /// The spec declares nothing.
    NoOp,
}

pub struct ModificationEngine;

impl ModificationEngine {
    /// Apply `spec` to the file bound to `alias` on behalf of `plugin`.
    pub fn apply(
        tree: &mut FileTree,
        alias: &LogicalFileAlias,
        spec: &ModificationSpec,
        plugin: &PluginId,
    ) -> Result<ModificationOutcome, DomainError> {
        if spec.is_empty() {
            return Ok(ModificationOutcome::NoOp);
        }
        spec.check_anchors().map_err(|reason| {
            DomainError::InvalidPlugin(format!("plugin '{plugin}' modifies '{alias}': {reason}"))
        })?;

        let path = tree.resolve_alias(alias)?.clone();
        let original = tree.read(&path)?.to_string();

        let wrapped = wrap(&original, spec).map_err(|anchor| DomainError::AnchorNotFound {
            alias: alias.to_string(),
            path: path.to_string(),
            anchor,
        })?;
        let updated = match non_blank(&spec.import_statements) {
            Some(statements) => insert_imports(&wrapped, statements),
            None => wrapped,
        };

        if updated == original {
            return Ok(ModificationOutcome::AlreadyApplied);
        }
        if tree.was_modified_by(&path, plugin) {
            return Err(DomainError::RedundantModification {
                target: alias.to_string(),
            });
        }

        tree.patch(&path, updated, plugin)?;
        Ok(ModificationOutcome::Applied)
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

// ── Wrapping ──────────────────────────────────────────────────────────────────

/// Insert the open/close tags around the anchors. Errors with the missing
/// anchor text.
fn wrap(content: &str, spec: &ModificationSpec) -> Result<String, String> {
    let before_at = match non_blank(&spec.add_before_match) {
        Some(anchor) => Some(content.find(anchor).ok_or_else(|| anchor.to_string())?),
        None => None,
    };

    let after_end = match non_blank(&spec.add_after_match) {
        Some(anchor) => {
            let from = before_at.unwrap_or(0);
            let found = content[from..]
                .find(anchor)
                .ok_or_else(|| anchor.to_string())?;
            Some(from + found + anchor.len())
        }
        None => None,
    };

    let open = before_at.zip(non_blank(&spec.open_tag));
    let close = after_end.zip(non_blank(&spec.close_tag));

    // A wrap counts as applied only when every declared tag encloses its
    // anchor without an unmatched counterpart in between. Otherwise all of
    // its tags are inserted, so a half-wrap is never produced.
    let applied = open.is_none_or(|(at, tag)| {
        opens_before(content, at, tag, close.map(|(_, t)| t))
    }) && close.is_none_or(|(end, tag)| {
        closes_after(content, end, tag, open.map(|(_, t)| t))
    });

    let mut inserts: Vec<(usize, &str)> = Vec::with_capacity(2);
    if !applied {
        inserts.extend(open);
        inserts.extend(close);
    }
    inserts.sort_by_key(|(at, _)| *at);

    let extra: usize = inserts.iter().map(|(_, s)| s.len()).sum();
    let mut out = String::with_capacity(content.len() + extra);
    let mut cursor = 0;
    for (at, text) in inserts {
        out.push_str(&content[cursor..at]);
        out.push_str(text);
        cursor = at;
    }
    out.push_str(&content[cursor..]);
    Ok(out)
}

/// `open` occurs before `at` and no `close` sits between it and `at`.
fn opens_before(content: &str, at: usize, open: &str, close: Option<&str>) -> bool {
    match content[..at].rfind(open) {
        Some(o) => close.is_none_or(|c| !content[o + open.len()..at].contains(c)),
        None => false,
    }
}

/// `close` occurs at or after `end` and no `open` sits between `end` and it.
fn closes_after(content: &str, end: usize, close: &str, open: Option<&str>) -> bool {
    match content[end..].find(close) {
        Some(c) => open.is_none_or(|o| !content[end..end + c].contains(o)),
        None => false,
    }
}

// ── Imports ───────────────────────────────────────────────────────────────────

fn insert_imports(content: &str, statements: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let missing: Vec<String> = split_statements(statements)
        .into_iter()
        .filter(|stmt| !normalized.contains(stmt.as_str()))
        .collect();
    if missing.is_empty() {
        return content.to_string();
    }

    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let at = insertion_line(&lines);

    let mut out = String::with_capacity(content.len() + statements.len() + 8);
    for line in &lines[..at] {
        out.push_str(line);
    }
    if at > 0 && !lines[at - 1].ends_with('\n') {
        out.push_str(newline);
    }
    for stmt in &missing {
        for line in stmt.lines() {
            out.push_str(line);
            out.push_str(newline);
        }
    }
    for line in &lines[at..] {
        out.push_str(line);
    }
    out
}

/// Group raw lines into whole statements, keeping multi-line
/// `import { ... } from` blocks together.
fn split_statements(statements: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut depth = 0i32;

    for line in statements.lines().map(str::trim_end) {
        if current.is_empty() && line.trim().is_empty() {
            continue;
        }
        depth += nesting_delta(line);
        current.push(line);
        if depth <= 0 && statement_closed(line) {
            out.push(current.join("\n"));
            current.clear();
            depth = 0;
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Index of the line before which new imports go.
fn insertion_line(lines: &[&str]) -> usize {
    let mut after_last_import = None;
    let mut in_import = false;
    let mut depth = 0i32;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if in_import {
            depth += nesting_delta(line);
            if depth <= 0 && statement_closed(line) {
                in_import = false;
                after_last_import = Some(i + 1);
            }
        } else if is_import_start(raw) {
            depth = nesting_delta(line);
            if depth <= 0 && statement_closed(line) {
                after_last_import = Some(i + 1);
            } else {
                in_import = true;
            }
        }
    }

    if let Some(at) = after_last_import {
        return at;
    }

    // No imports: go below a leading directive prologue.
    let mut after_directive = 0;
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if is_directive(line) {
            after_directive = i + 1;
        } else if !(line.is_empty() || line.starts_with("//")) {
            break;
        }
    }
    after_directive
}

fn is_import_start(raw: &str) -> bool {
    let raw = raw.trim_end();
    let is_import = raw.starts_with("import ")
        || raw.starts_with("import{")
        || raw.starts_with("import\"")
        || raw.starts_with("import'");
    let is_require = (raw.starts_with("const ") || raw.starts_with("let ") || raw.starts_with("var "))
        && raw.contains("require(");
    is_import || is_require
}

fn is_directive(line: &str) -> bool {
    (line.starts_with('"') || line.starts_with('\'')) && line.contains("use ")
}

fn nesting_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' | '(' => acc + 1,
        '}' | ')' => acc - 1,
        _ => acc,
    })
}

fn statement_closed(line: &str) -> bool {
    line.ends_with(';') || line.contains('"') || line.contains('\'') || line.contains('`')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::common::ProjectPath;

    const LAYOUT: &str = r#"import type { Metadata } from "next";
import { Inter } from "next/font/google";
import "./globals.css";

const inter = Inter({ subsets: ["latin"] });

export default function RootLayout({
  children,
}: {
  children: React.ReactNode;
}) {
  return (
    <html lang="en">
      <body className={inter.className}>{children}</body>
    </html>
  );
}
"#;

    fn tree_with(alias: &str, path: &str, content: &str) -> FileTree {
        let mut tree = FileTree::new();
        tree.seed(ProjectPath::new(path), content);
        tree.bind_alias(LogicalFileAlias::new(alias), ProjectPath::new(path))
            .unwrap();
        tree
    }

    fn providers_spec() -> ModificationSpec {
        ModificationSpec::new()
            .imports(r#"import { Providers } from "@/components/Providers/Providers.client";"#)
            .wrap("{children}", "<Providers>", "</Providers>")
    }

    fn read(tree: &FileTree, path: &str) -> String {
        tree.read(&ProjectPath::new(path)).unwrap().to_string()
    }

    #[test]
    fn wraps_children_and_adds_import_after_last_import() {
        let mut tree = tree_with("Layout", "src/app/layout.tsx", LAYOUT);
        let outcome = ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::layout(),
            &providers_spec(),
            &PluginId::new("dataFetching"),
        )
        .unwrap();
        assert_eq!(outcome, ModificationOutcome::Applied);

        let out = read(&tree, "src/app/layout.tsx");
        assert!(out.contains("<body className={inter.className}><Providers>{children}</Providers></body>"));
        assert!(out.contains(
            "import \"./globals.css\";\nimport { Providers } from \"@/components/Providers/Providers.client\";\n\nconst inter"
        ));
    }

    #[test]
    fn reapplying_is_a_no_op() {
        let mut tree = tree_with("Layout", "src/app/layout.tsx", LAYOUT);
        let spec = providers_spec();
        ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), &spec, &PluginId::new("a"))
            .unwrap();
        let once = read(&tree, "src/app/layout.tsx");

        let outcome = ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::layout(),
            &spec,
            &PluginId::new("b"),
        )
        .unwrap();
        assert_eq!(outcome, ModificationOutcome::AlreadyApplied);
        assert_eq!(read(&tree, "src/app/layout.tsx"), once);
    }

    #[test]
    fn later_wraps_nest_outside() {
        let mut tree = tree_with("App", "src/App.tsx", "<X/>");
        let a = ModificationSpec::new().before("<X", "<A>").after("/>", "</A>");
        let b = ModificationSpec::new().before("<A>", "<B>").after("</A>", "</B>");

        ModificationEngine::apply(&mut tree, &LogicalFileAlias::app(), &a, &PluginId::new("a")).unwrap();
        ModificationEngine::apply(&mut tree, &LogicalFileAlias::app(), &b, &PluginId::new("b")).unwrap();

        assert_eq!(read(&tree, "src/App.tsx"), "<B><A><X/></A></B>");
    }

    #[test]
    fn unrelated_markup_does_not_count_as_wrap() {
        let mut tree = tree_with("Layout", "layout.tsx", "<Shell>nav</Shell>\n<main>{children}</main>\n");
        let spec = ModificationSpec::new().wrap("{children}", "<Shell>", "</Shell>");

        let outcome =
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), &spec, &PluginId::new("a"))
                .unwrap();
        assert_eq!(outcome, ModificationOutcome::Applied);
        assert_eq!(
            read(&tree, "layout.tsx"),
            "<Shell>nav</Shell>\n<main><Shell>{children}</Shell></main>\n"
        );

        let again =
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), &spec, &PluginId::new("b"))
                .unwrap();
        assert_eq!(again, ModificationOutcome::AlreadyApplied);
    }

    #[test]
    fn tags_on_both_sides_must_pair_with_the_anchor() {
        let base = "<Shell>nav</Shell>\n<main>{children}</main>\n<Shell>footer</Shell>\n";
        let mut tree = tree_with("Layout", "layout.tsx", base);
        let spec = ModificationSpec::new().wrap("{children}", "<Shell>", "</Shell>");

        let outcome =
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), &spec, &PluginId::new("a"))
                .unwrap();
        assert_eq!(outcome, ModificationOutcome::Applied);
        assert_eq!(
            read(&tree, "layout.tsx"),
            "<Shell>nav</Shell>\n<main><Shell>{children}</Shell></main>\n<Shell>footer</Shell>\n"
        );
    }

    #[test]
    fn wraps_on_the_same_anchor_stay_idempotent() {
        let mut tree = tree_with("Layout", "layout.tsx", "<body>{children}</body>");
        let a = ModificationSpec::new().wrap("{children}", "<A>", "</A>");
        let b = ModificationSpec::new().wrap("{children}", "<B>", "</B>");

        for (id, spec) in [("a", &a), ("b", &b)] {
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), spec, &PluginId::new(id))
                .unwrap();
        }
        assert_eq!(read(&tree, "layout.tsx"), "<body><A><B>{children}</B></A></body>");

        let rerun =
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::layout(), &a, &PluginId::new("c"))
                .unwrap();
        assert_eq!(rerun, ModificationOutcome::AlreadyApplied);
    }

    #[test]
    fn tags_without_anchors_are_rejected() {
        let mut tree = tree_with("App", "src/App.tsx", "<X/>");
        let spec = ModificationSpec {
            open_tag: Some("<A>".into()),
            close_tag: Some("</A>".into()),
            ..ModificationSpec::default()
        };

        let err = ModificationEngine::apply(&mut tree, &LogicalFileAlias::app(), &spec, &PluginId::new("p"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPlugin(_)));
        assert_eq!(read(&tree, "src/App.tsx"), "<X/>");
    }

    #[test]
    fn missing_anchor_leaves_file_untouched() {
        let mut tree = tree_with("Layout", "src/app/layout.tsx", LAYOUT);
        let spec = ModificationSpec::new()
            .imports("import x from \"x\";")
            .wrap("<main>", "<Shell>", "</Shell>");

        let err = ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::layout(),
            &spec,
            &PluginId::new("p"),
        )
        .unwrap_err();

        match err {
            DomainError::AnchorNotFound { alias, anchor, .. } => {
                assert_eq!(alias, "Layout");
                assert_eq!(anchor, "<main>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(read(&tree, "src/app/layout.tsx"), LAYOUT);
    }

    #[test]
    fn after_anchor_is_searched_from_before_anchor() {
        let mut tree = tree_with("Page", "page.tsx", "</A> <A>body</A>");
        let spec = ModificationSpec::new().before("<A>", "[").after("</A>", "]");
        ModificationEngine::apply(&mut tree, &LogicalFileAlias::page(), &spec, &PluginId::new("p"))
            .unwrap();
        assert_eq!(read(&tree, "page.tsx"), "</A> [<A>body</A>]");
    }

    #[test]
    fn import_order_follows_plugin_order() {
        let mut tree = tree_with("Main", "src/main.tsx", "import React from \"react\";\n\nrender();\n");
        for (id, stmt) in [("a", "import A from \"a\";"), ("b", "import B from \"b\";")] {
            let spec = ModificationSpec::new().imports(stmt);
            ModificationEngine::apply(&mut tree, &LogicalFileAlias::main(), &spec, &PluginId::new(id))
                .unwrap();
        }
        assert_eq!(
            read(&tree, "src/main.tsx"),
            "import React from \"react\";\nimport A from \"a\";\nimport B from \"b\";\n\nrender();\n"
        );
    }

    #[test]
    fn multi_line_imports_are_respected() {
        let base = "import {\n  a,\n  b,\n} from \"x\";\nconst y = 1;\n";
        let statements = "import {\n  c,\n} from \"c\";\nimport d from \"d\";";
        let out = insert_imports(base, statements);
        assert_eq!(
            out,
            "import {\n  a,\n  b,\n} from \"x\";\nimport {\n  c,\n} from \"c\";\nimport d from \"d\";\nconst y = 1;\n"
        );
        // Second pass finds both statements verbatim.
        assert_eq!(insert_imports(&out, statements), out);
    }

    #[test]
    fn only_missing_statements_are_inserted() {
        let base = "import a from \"a\";\n";
        let out = insert_imports(base, "import a from \"a\";\nimport b from \"b\";");
        assert_eq!(out, "import a from \"a\";\nimport b from \"b\";\n");
    }

    #[test]
    fn imports_go_below_use_client_directive() {
        let base = "\"use client\";\n\nexport default function Page() {}\n";
        let out = insert_imports(base, "import x from \"x\";");
        assert_eq!(out, "\"use client\";\nimport x from \"x\";\n\nexport default function Page() {}\n");
    }

    #[test]
    fn imports_go_on_top_without_imports_or_directives() {
        let out = insert_imports("export const a = 1;", "import x from \"x\";");
        assert_eq!(out, "import x from \"x\";\nexport const a = 1;");
    }

    #[test]
    fn crlf_line_endings_are_preserved() {
        let base = "import a from \"a\";\r\nconst b = 2;\r\n";
        let out = insert_imports(base, "import c from \"c\";");
        assert_eq!(out, "import a from \"a\";\r\nimport c from \"c\";\r\nconst b = 2;\r\n");
    }

    #[test]
    fn require_lines_count_as_imports() {
        let base = "const a = require(\"a\");\nmodule.exports = a;\n";
        let out = insert_imports(base, "const b = require(\"b\");");
        assert_eq!(out, "const a = require(\"a\");\nconst b = require(\"b\");\nmodule.exports = a;\n");
    }

    #[test]
    fn empty_spec_skips_alias_resolution() {
        let mut tree = FileTree::new();
        let outcome = ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::page(),
            &ModificationSpec::new(),
            &PluginId::new("p"),
        )
        .unwrap();
        assert_eq!(outcome, ModificationOutcome::NoOp);
    }

    #[test]
    fn unbound_alias_is_reported() {
        let mut tree = FileTree::new();
        let spec = ModificationSpec::new().imports("import a from \"a\";");
        let err = ModificationEngine::apply(&mut tree, &LogicalFileAlias::page(), &spec, &PluginId::new("p"))
            .unwrap_err();
        assert!(matches!(err, DomainError::AliasNotFound { .. }));
    }

    #[test]
    fn same_plugin_cannot_modify_a_file_twice() {
        let mut tree = tree_with("Layout", "src/app/layout.tsx", LAYOUT);
        let p = PluginId::new("p");
        ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::layout(),
            &ModificationSpec::new().imports("import a from \"a\";"),
            &p,
        )
        .unwrap();

        let err = ModificationEngine::apply(
            &mut tree,
            &LogicalFileAlias::layout(),
            &ModificationSpec::new().imports("import b from \"b\";"),
            &p,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::RedundantModification { .. }));
    }
}
