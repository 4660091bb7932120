use dotlang::ast::Rule;
use dotlang::StringifyOptions;
use pretty_assertions::assert_eq;

const DEPS: &str = "\
/* header */
strict digraph \"deps\" {
  rankdir=LR
  node [shape=box, style=\"rounded\"]
  edge [color=gray]
  subgraph cluster_core {
    label=\"Core\"
    parser; convert
  }
  // wiring
  parser -> convert -> model [weight=2]
  model -> {stringify cli}
}
";

#[test]
fn snapshot_reformat_document() {
    let output = dotlang::reformat(DEPS, Rule::Graph, &StringifyOptions::default()).unwrap();
    let expected = "\
/**
 * header
 */
strict digraph \"deps\" {
  rankdir = LR;
  node [
    shape = box;
    style = \"rounded\";
  ];
  edge [
    color = gray;
  ];
  subgraph cluster_core {
    label = \"Core\";
    parser;
    convert;
  }
  // wiring
  parser -> convert -> model [
    weight = 2;
  ];
  model -> {stringify cli};
}";
    assert_eq!(output, expected);
}

#[test]
fn snapshot_normalize_document() {
    let output = dotlang::normalize(DEPS, &StringifyOptions::default()).unwrap();
    let expected = "\
strict digraph deps {
  rankdir = LR;
  node [
    shape = box;
    style = rounded;
  ];
  edge [
    color = gray;
  ];
  subgraph cluster_core {
    label = Core;
    parser;
    convert;
  }
  parser -> convert -> model [
    weight = 2;
  ];
  model -> {stringify cli};
}";
    assert_eq!(output, expected);
}

#[test]
fn snapshot_wide_indent() {
    let input = "graph { subgraph a { subgraph b { x -- y [len=1.5] } } }";
    let options = StringifyOptions {
        indent_size: 4,
        ..StringifyOptions::default()
    };
    let output = dotlang::reformat(input, Rule::Graph, &options).unwrap();
    let expected = "\
graph {
    subgraph a {
        subgraph b {
            x -- y [
                len = 1.5;
            ];
        }
    }
}";
    assert_eq!(output, expected);
}

#[test]
fn snapshot_normalize_merges_and_quotes() {
    let input = "\
digraph {
  a [label=\"first\"]
  b
  a [label=\"say \\\"hi\\\"\", shape=circle]
  a -> b
  \"node\" -> b
}";
    let output = dotlang::normalize(input, &StringifyOptions::default()).unwrap();
    let expected = "\
digraph {
  a [
    label = \"say \\\"hi\\\"\";
    shape = circle;
  ];
  b;
  a -> b;
  \"node\" -> b;
}";
    assert_eq!(output, expected);
}

#[test]
fn snapshot_attributes_fragment() {
    let output = dotlang::reformat(
        "edge [arrowhead=none] [color=\"#ccc\"]",
        Rule::Attributes,
        &StringifyOptions::default(),
    )
    .unwrap();
    assert_eq!(output, "edge [\n  arrowhead = none;\n  color = \"#ccc\";\n];");
}
