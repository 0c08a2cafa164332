//! Mechanical source checks run as part of the unit test suite.
//!
//! Rules, all failing the build:
//! - No `.unwrap()` or `.expect()` outside `#[cfg(test)]` code.
//! - No `println!`, `eprintln!`, `print!` or `dbg!` in library code; log through `tracing`.
//! - Public free functions and public structs carry documentation.
//! - No `FIXME` markers.
//! - No grab-bag module names such as `utils.rs`.
//!
//! Formatting and clippy lints are left to `rustfmt` and `cargo clippy`.

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Attribute, ExprMethodCall, ItemFn, ItemMod, ItemStruct, Macro, Visibility};

const FORBIDDEN_METHODS: &[&str] = &["unwrap", "expect"];
const FORBIDDEN_MACROS: &[&str] = &["println", "eprintln", "print", "eprint", "dbg"];
const GRAB_BAG_MODULES: &[&str] = &["utils.rs", "helpers.rs", "misc.rs", "common.rs"];

#[derive(Debug)]
struct Violation {
    path: String,
    line: usize,
    message: String,
}

impl Violation {
    fn new(path: &Path, line: usize, message: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            line,
            message: message.into(),
        }
    }
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .meta
                .require_list()
                .is_ok_and(|list| list.tokens.to_string() == "test")
    })
}

fn has_doc(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("doc"))
}

/// Walks one file, tracking whether it is inside test-only code.
struct SourceVisitor<'a> {
    path: &'a Path,
    test_depth: usize,
    violations: Vec<Violation>,
}

impl<'a> SourceVisitor<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            test_depth: 0,
            violations: Vec::new(),
        }
    }

    fn in_library_code(&self) -> bool {
        self.test_depth == 0
    }

    fn flag(&mut self, span: Span, message: impl Into<String>) {
        self.violations
            .push(Violation::new(self.path, span.start().line, message));
    }
}

impl<'ast> Visit<'ast> for SourceVisitor<'_> {
    fn visit_item_mod(&mut self, item: &'ast ItemMod) {
        let test_only = is_cfg_test(&item.attrs);
        self.test_depth += usize::from(test_only);
        visit::visit_item_mod(self, item);
        self.test_depth -= usize::from(test_only);
    }

    fn visit_item_fn(&mut self, item: &'ast ItemFn) {
        let test_only = is_cfg_test(&item.attrs)
            || item.attrs.iter().any(|attr| attr.path().is_ident("test"));
        if self.in_library_code()
            && !test_only
            && matches!(item.vis, Visibility::Public(_))
            && !has_doc(&item.attrs)
        {
            self.flag(
                item.sig.ident.span(),
                format!("public function '{}' is undocumented", item.sig.ident),
            );
        }
        self.test_depth += usize::from(test_only);
        visit::visit_item_fn(self, item);
        self.test_depth -= usize::from(test_only);
    }

    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        if self.in_library_code()
            && matches!(item.vis, Visibility::Public(_))
            && !has_doc(&item.attrs)
        {
            self.flag(
                item.ident.span(),
                format!("public struct '{}' is undocumented", item.ident),
            );
        }
        visit::visit_item_struct(self, item);
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        let method = call.method.to_string();
        if self.in_library_code() && FORBIDDEN_METHODS.contains(&method.as_str()) {
            self.flag(
                call.method.span(),
                format!(".{method}() in library code; propagate the error instead"),
            );
        }
        visit::visit_expr_method_call(self, call);
    }

    fn visit_macro(&mut self, mac: &'ast Macro) {
        let name = mac.path.get_ident().map(ToString::to_string).unwrap_or_default();
        if self.in_library_code() && FORBIDDEN_MACROS.contains(&name.as_str()) {
            self.flag(
                mac.path.span(),
                format!("{name}! in library code; log through tracing"),
            );
        }
        visit::visit_macro(self, mac);
    }
}

fn library_sources() -> Vec<PathBuf> {
    walkdir::WalkDir::new("src")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .filter(|path| !path.ends_with("tidy.rs"))
        .collect()
}

fn check_file(path: &Path, violations: &mut Vec<Violation>) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            violations.push(Violation::new(path, 0, format!("unreadable: {e}")));
            return;
        }
    };
    for (i, line) in text.lines().enumerate() {
        if line.contains("FIXME") {
            violations.push(Violation::new(path, i + 1, "FIXME marker"));
        }
    }
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    if GRAB_BAG_MODULES.contains(&name) {
        violations.push(Violation::new(path, 0, "grab-bag module name"));
    }
    match syn::parse_file(&text) {
        Ok(ast) => {
            let mut visitor = SourceVisitor::new(path);
            visitor.visit_file(&ast);
            violations.extend(visitor.violations);
        }
        Err(e) => violations.push(Violation::new(
            path,
            e.span().start().line,
            format!("does not parse: {e}"),
        )),
    }
}

#[test]
fn library_sources_are_tidy() {
    let sources = library_sources();
    assert!(!sources.is_empty(), "run from the crate root");
    let mut violations = Vec::new();
    for path in &sources {
        check_file(path, &mut violations);
    }
    violations.sort_by(|a, b| (&a.path, a.line).cmp(&(&b.path, b.line)));
    assert!(
        violations.is_empty(),
        "\n{}\n",
        violations
            .iter()
            .map(|v| format!("{}:{}: {}", v.path, v.line, v.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn visitor_skips_test_modules() {
    let source = r#"
        /// Documented.
        pub fn ok() -> Option<u8> { Some(1) }
        pub fn bare() {}
        fn library() { let _ = Some(1).unwrap(); println!("x"); }
        #[cfg(test)]
        mod tests {
            fn helper() { let _ = Some(1).unwrap(); println!("x"); }
        }
    "#;
    let ast = syn::parse_file(source).unwrap();
    let path = Path::new("inline.rs");
    let mut visitor = SourceVisitor::new(path);
    visitor.visit_file(&ast);
    let messages: Vec<_> = visitor.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages.len(), 3, "{messages:?}");
    assert!(messages[0].contains("'bare'"));
    assert!(messages[1].contains(".unwrap()"));
    assert!(messages[2].contains("println!"));
}
