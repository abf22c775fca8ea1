// PY_SOURCE: tests/delta_debugging/parsers/test_tree_sitter.py
// PY_SOURCE: tests/delta_debugging/algorithms/test_hdd.py

use deltadebug::{AlgorithmSpec, Debugger, Hdd, Outcome, Parser, TreeSitterParser};

const SOURCE: &str = "int helper(int x) { return x + 1; }\n\
int main(void) {\n    int a = 1;\n    int b = helper(a);\n    return b;\n}\n";

fn returns_b(selected: &[u8]) -> Outcome {
    if String::from_utf8_lossy(selected).contains("return b;") {
        Outcome::Fail
    } else {
        Outcome::Pass
    }
}

#[test]
fn reduces_c_source_to_the_failing_statement() {
    for spec in ["hdd-c:ddmin", "hdd-c:zipmin", "hdd-c:probdd"] {
        let spec: AlgorithmSpec = spec.parse().expect("algorithm");
        let mut debugger: Debugger<u8> = Debugger::new(spec.build(), Box::new(returns_b));
        let config = debugger.debug(SOURCE.as_bytes()).expect("debug");
        let reduced = String::from_utf8(config.select(SOURCE.as_bytes())).expect("utf-8");
        assert_eq!(reduced, "return b;\n", "{spec}");
    }
}

#[test]
fn without_whitespace_expansion_only_token_bytes_remain() {
    let tight = Hdd::new(
        Box::new(TreeSitterParser::c().with_expand_whitespace(false)),
        AlgorithmSpec::DdMin.build(),
    );
    let mut debugger: Debugger<u8> = Debugger::new(
        Box::new(tight),
        Box::new(|selected: &[u8]| {
            if String::from_utf8_lossy(selected).contains("returnb;") {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        }),
    );
    let config = debugger.debug(SOURCE.as_bytes()).expect("debug");
    assert_eq!(config.select(SOURCE.as_bytes()), b"returnb;");
}

#[test]
fn whole_source_parses_into_two_functions() {
    let root = TreeSitterParser::c().parse(SOURCE.as_bytes()).expect("parse");
    let functions: Vec<&str> = root.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(functions, ["function_definition", "function_definition"]);
    assert_eq!(root.end, SOURCE.len());
}
