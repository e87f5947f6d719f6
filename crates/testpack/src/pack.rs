//! Bundle emission in the browser-pack layout.
//!
//! ```text
//! <PRELUDE>({1:[function(require,module,exports){
//! <source>
//! },{"./dep.js":2}],2:[...]},{},[1]);
//! ```
//!
//! The prelude calls every entry in order. A `require` whose specifier is not
//! in the module's dependency map falls through to the host `require`, which
//! is how externals are reached.

use std::fmt::Write as _;

use crate::graph::{ModuleGraph, PackedModule};

/// The browser-pack `require` prelude.
pub const PRELUDE: &str = concat!(
    "(function(){function r(e,n,t){function o(i,f){if(!n[i]){if(!e[i]){",
    "var c=\"function\"==typeof require&&require;if(!f&&c)return c(i,!0);",
    "if(u)return u(i,!0);var a=new Error(\"Cannot find module '\"+i+\"'\");",
    "throw a.code=\"MODULE_NOT_FOUND\",a}var p=n[i]={exports:{}};",
    "e[i][0].call(p.exports,function(r){var n=e[i][1][r];return o(n||r)},",
    "p,p.exports,r,e,n,t)}return n[i].exports}",
    "for(var u=\"function\"==typeof require&&require,i=0;i<t.length;i++)o(t[i]);",
    "return o}return r})()",
);

/// Emit the bundle for `graph`.
///
/// The output is a single script ending in a newline. Modules appear in id
/// order and dependency maps are sorted by specifier, so the bytes only
/// depend on the files bundled.
pub fn emit(graph: &ModuleGraph) -> Vec<u8> {
    let capacity = PRELUDE.len()
        + graph
            .modules()
            .iter()
            .map(|m| m.source.len() + 64)
            .sum::<usize>();
    let mut out = String::with_capacity(capacity);

    out.push_str(PRELUDE);
    out.push_str("({");
    for (idx, module) in graph.modules().iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write_module(&mut out, module);
    }
    out.push_str("},{},[");
    let entries: Vec<String> = graph.entries().iter().map(u32::to_string).collect();
    out.push_str(&entries.join(","));
    out.push_str("]);\n");

    out.into_bytes()
}

fn write_module(out: &mut String, module: &PackedModule) {
    // Writing into a String cannot fail
    let _ = write!(
        out,
        "{}:[function(require,module,exports){{\n{}\n}},",
        module.id, module.source
    );
    write_deps(out, module);
    out.push(']');
}

fn write_deps(out: &mut String, module: &PackedModule) {
    out.push('{');
    for (idx, (specifier, id)) in module.deps.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::Value::String(specifier.clone()).to_string());
        let _ = write!(out, ":{}", id);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphWalker;
    use crate::resolver::ModuleResolver;
    use crate::runtime::MemoryRuntime;
    use std::path::PathBuf;

    async fn pack(runtime: &MemoryRuntime, entries: &[&str], external: &[&str]) -> String {
        let entries: Vec<PathBuf> = entries.iter().map(PathBuf::from).collect();
        let resolver = ModuleResolver::new(external.iter().map(|s| s.to_string()).collect());
        let graph = GraphWalker::new(resolver)
            .walk(&entries, runtime)
            .await
            .unwrap();
        String::from_utf8(emit(&graph)).unwrap()
    }

    #[test]
    fn test_prelude_is_single_line() {
        assert!(!PRELUDE.contains('\n'));
        assert!(PRELUDE.starts_with("(function(){"));
        assert!(PRELUDE.ends_with("return r})()"));
    }

    #[tokio::test]
    async fn test_layout() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("index.js", "var add = require('./add.js');");
        runtime.add_file("add.js", "module.exports = 1;");

        let code = pack(&runtime, &["/p/index.js"], &[]).await;
        let expected = format!(
            "{}({{1:[function(require,module,exports){{\nmodule.exports = 1;\n}},{{}}],\
             2:[function(require,module,exports){{\nvar add = require('./add.js');\n}},{{\"./add.js\":1}}]}},{{}},[2]);\n",
            PRELUDE
        );
        assert_eq!(code, expected);
    }

    #[tokio::test]
    async fn test_deps_sorted_and_externals_omitted() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file(
            "test.js",
            "require('tape'); require('./z.js'); require('./a.json');",
        );
        runtime.add_file("z.js", "");
        runtime.add_file("a.json", "{\"a\": 1}\n");

        let code = pack(&runtime, &["/p/test.js"], &["tape"]).await;
        assert!(code.contains("{\"./a.json\":1,\"./z.js\":3}"));
        assert!(code.contains("module.exports={\"a\": 1}"));
        assert!(!code.contains("\"tape\""));
        assert!(code.ends_with(",{},[2]);\n"));
    }

    #[tokio::test]
    async fn test_specifiers_are_escaped() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("test.js", "require(\"./we\\\"ird.js\");");
        runtime.add_file("we\"ird.js", "");

        let code = pack(&runtime, &["/p/test.js"], &[]).await;
        assert!(code.contains(r#"{"./we\"ird.js":2}"#));
    }

    #[tokio::test]
    async fn test_multiple_entries() {
        let runtime = MemoryRuntime::new("/p");
        runtime.add_file("a/test.js", "");
        runtime.add_file("b/test.js", "");

        let code = pack(&runtime, &["/p/a/test.js", "/p/b/test.js"], &[]).await;
        assert!(code.ends_with("},{},[1,2]);\n"));
    }
}
