use std::{
    collections::BTreeSet,
    env, fs,
    path::{Path, PathBuf},
};

use syn::{Expr, ExprLit, ExprMethodCall, File, Lit, visit::Visit};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RouteEntry {
    path: String,
    method: String,
    handler: String,
    source: String,
}

struct RouteVisitor {
    file: String,
    routes: Vec<RouteEntry>,
}

impl<'ast> Visit<'ast> for RouteVisitor {
    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if node.method == "route" {
            let line = node.method.span().start().line;
            let source = format!("{}:{}", self.file, line);
            match node.args.first().and_then(extract_string_literal) {
                Some(path) => {
                    let mut handlers = Vec::new();
                    if let Some(method_router) = node.args.iter().nth(1) {
                        collect_handlers(method_router, &mut handlers);
                    }
                    handlers.reverse();
                    for (method, handler) in handlers {
                        self.routes.push(RouteEntry {
                            path: path.clone(),
                            method,
                            handler,
                            source: source.clone(),
                        });
                    }
                }
                None => println!("cargo:warning=Skipping non-literal route path at {source}"),
            }
        }

        syn::visit::visit_expr_method_call(self, node);
    }
}

fn extract_string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(value),
            ..
        }) => Some(value.value()),
        Expr::Paren(expr) => extract_string_literal(&expr.expr),
        Expr::Reference(expr) => extract_string_literal(&expr.expr),
        _ => None,
    }
}

// Walks `get(a).put(b).delete(c)` from the outside in, yielding (METHOD, handler) pairs.
fn collect_handlers(expr: &Expr, out: &mut Vec<(String, String)>) {
    match expr {
        Expr::MethodCall(call) => {
            if let Some(method) = normalize_method(&call.method.to_string()) {
                out.push((method.to_string(), handler_name(call.args.first())));
            }
            collect_handlers(&call.receiver, out);
        }
        Expr::Call(call) => {
            if let Expr::Path(func) = &*call.func {
                if let Some(segment) = func.path.segments.last() {
                    if let Some(method) = normalize_method(&segment.ident.to_string()) {
                        out.push((method.to_string(), handler_name(call.args.first())));
                    }
                }
            }
        }
        Expr::Paren(expr) => collect_handlers(&expr.expr, out),
        Expr::Reference(expr) => collect_handlers(&expr.expr, out),
        _ => {}
    }
}

fn handler_name(arg: Option<&Expr>) -> String {
    match arg {
        Some(Expr::Path(path)) => path
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::"),
        _ => "<closure>".to_string(),
    }
}

fn normalize_method(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "get" => Some("GET"),
        "post" => Some("POST"),
        "put" => Some("PUT"),
        "delete" => Some("DELETE"),
        "patch" => Some("PATCH"),
        "head" => Some("HEAD"),
        "options" => Some("OPTIONS"),
        "any" => Some("ANY"),
        _ => None,
    }
}

fn escape_rust_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn parse_file(path: &Path, manifest_dir: &Path) -> Vec<RouteEntry> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err));
    let parsed: File = syn::parse_file(&content)
        .unwrap_or_else(|err| panic!("failed to parse {}: {}", path.display(), err));
    let file = path
        .strip_prefix(manifest_dir)
        .unwrap_or(path)
        .display()
        .to_string();
    let mut visitor = RouteVisitor {
        file,
        routes: Vec::new(),
    };
    visitor.visit_file(&parsed);
    visitor.routes
}

fn collect_route_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", dir.display(), err));
    for entry in entries {
        let path = entry
            .unwrap_or_else(|err| panic!("failed to read dir entry: {}", err))
            .path();
        if path.is_dir() {
            collect_route_files(&path, files);
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
            files.push(path);
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(&manifest_dir);
    let routes_dir = manifest_path.join("src/routes");
    println!("cargo:rerun-if-changed={}", routes_dir.display());

    let mut files = Vec::new();
    collect_route_files(&routes_dir, &mut files);
    files.sort();

    let mut routes = BTreeSet::new();
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
        routes.extend(parse_file(file, manifest_path));
    }

    let out_dir = env::var("OUT_DIR").expect("missing OUT_DIR");
    let out_path = Path::new(&out_dir).join("routes_generated.rs");
    let mut output = String::from("pub static ROUTES: &[RouteInfo] = &[\n");
    for route in routes {
        output.push_str(&format!(
            "    RouteInfo {{ method: \"{}\", path: \"{}\", handler: \"{}\", source: \"{}\" }},\n",
            escape_rust_string(&route.method),
            escape_rust_string(&route.path),
            escape_rust_string(&route.handler),
            escape_rust_string(&route.source)
        ));
    }
    output.push_str("];\n");

    fs::write(&out_path, output)
        .unwrap_or_else(|err| panic!("failed to write {}: {}", out_path.display(), err));
}
