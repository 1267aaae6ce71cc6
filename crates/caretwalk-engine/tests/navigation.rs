use caretwalk_engine::tree::descendants;
use caretwalk_engine::{
    CursorManager, DocumentTree, Dom, GeometryOracle, LineWrapRule, MonospaceLayout, NodeId,
    Position, PositionWalker, Rect, ZeroWidthPair, parse_markup, position_at,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const NESTED: &str = "<div>abc<b>def</b>ghi</div>";

/// Position for flat offset `k`, found by adding up text lengths in document
/// order.
fn accumulated_position(dom: &Dom, container: NodeId, k: usize) -> Position<NodeId> {
    let mut remaining = k;
    let texts: Vec<(NodeId, usize)> = descendants(dom, container)
        .filter_map(|node| Some((node, dom.text(node)?.chars().count())))
        .filter(|&(_, len)| len > 0)
        .collect();
    for &(node, len) in &texts {
        if remaining < len {
            return Position {
                node,
                offset: remaining,
            };
        }
        remaining -= len;
    }
    let &(node, len) = texts.last().expect("container has text");
    assert_eq!(remaining, 0, "offset {k} is past the content");
    Position { node, offset: len }
}

#[rstest]
#[case::flat("<div>hello</div>")]
#[case::nested(NESTED)]
#[case::deep("<div><p><i><b>a</b></i>bc</p><p></p><p>d<br/>e</p></div>")]
fn k_steps_advance_k_characters(#[case] markup: &str) {
    let (dom, container) = parse_markup(markup).unwrap();
    let total = dom.text_content(container).chars().count();
    let mut walker = PositionWalker::new(&dom, container);

    for k in 1..=total {
        walker.next_position(&dom);
        assert_eq!(walker.position(), accumulated_position(&dom, container, k), "k = {k}");
        assert_eq!(position_at(&dom, container, k), Ok(walker.position()));
    }
    assert!(walker.is_at_end(&dom));
}

#[test]
fn k_steps_on_a_known_document() {
    let (dom, container) = parse_markup(NESTED).unwrap();
    let [abc, b, ghi] = [0, 1, 2].map(|i| dom.children(container)[i]);
    let def = dom.children(b)[0];
    let expected = [
        (abc, 0),
        (abc, 1),
        (abc, 2),
        (def, 0),
        (def, 1),
        (def, 2),
        (ghi, 0),
        (ghi, 1),
        (ghi, 2),
        (ghi, 3),
    ];

    let mut walker = PositionWalker::new(&dom, container);
    for (k, &(node, offset)) in expected.iter().enumerate() {
        assert_eq!(walker.position(), Position { node, offset }, "k = {k}");
        walker.next_position(&dom);
    }
}

#[rstest]
#[case::nested(NESTED)]
#[case::with_empty_elements("<div><br/>ab<p><i></i></p>c<hr/></div>")]
fn each_step_is_locally_invertible(#[case] markup: &str) {
    let (dom, container) = parse_markup(markup).unwrap();
    let mut walker = PositionWalker::new(&dom, container);

    while !walker.is_at_end(&dom) {
        let before = walker.position();
        let mut probe = walker.clone();
        probe.next_position(&dom);
        probe.previous_position(&dom);
        assert_eq!(probe.position(), before);

        walker.next_position(&dom);
    }
}

#[test]
fn boundaries_are_idempotent() {
    let (dom, container) = parse_markup(NESTED).unwrap();
    let mut walker = PositionWalker::new(&dom, container);

    let start = walker.position();
    walker.previous_position(&dom);
    walker.previous_position(&dom);
    assert_eq!(walker.position(), start);

    while !walker.is_at_end(&dom) {
        walker.next_position(&dom);
    }
    let end = walker.position();
    walker.next_position(&dom);
    assert_eq!(walker.position(), end);
    assert!(walker.is_at_end(&dom));
}

#[test]
fn walk_matches_the_character_sequence() {
    let (dom, container) = parse_markup(NESTED).unwrap();
    let mut walker = PositionWalker::new(&dom, container);
    let mut seen = String::new();

    while !walker.is_at_end(&dom) {
        let Position { node, offset } = walker.position();
        let text = dom.text(node).unwrap();
        seen.extend(text.chars().nth(offset));
        walker.next_position(&dom);
    }

    assert_eq!(seen, "abcdefghi");
}

#[test]
fn cloned_walkers_are_independent() {
    let (dom, container) = parse_markup(NESTED).unwrap();
    let mut first = PositionWalker::new(&dom, container);
    let second = first.clone();

    for _ in 0..5 {
        first.next_position(&dom);
    }

    assert_eq!(position_at(&dom, container, 5), Ok(first.position()));
    assert_eq!(position_at(&dom, container, 0), Ok(second.position()));
}

#[test]
fn works_on_trees_built_by_hand() {
    let mut dom = Dom::new();
    let list = dom.create_element("ul");
    dom.append_child(dom.root(), list).unwrap();
    for word in ["one", "two"] {
        let item = dom.create_element("li");
        let text = dom.create_text(word);
        dom.append_child(item, text).unwrap();
        dom.append_child(list, item).unwrap();
    }

    let mut walker = PositionWalker::new(&dom, list);
    for _ in 0..3 {
        walker.next_position(&dom);
    }

    assert_eq!(dom.text(walker.current_node()), Some("two"));
    assert_eq!(walker.local_offset(), 0);
}

#[test]
fn up_after_down_returns_to_the_closest_column() {
    // the quick
    // brown fox
    // jumps
    let (dom, container) = parse_markup("<p>the quick brown fox jumps</p>").unwrap();
    let layout = MonospaceLayout::new(&dom, container, 10);
    assert_eq!(layout.lines(), ["the quick", "brown fox", "jumps"]);

    for column in 0..9 {
        let mut cursor = CursorManager::new(&dom, container, &layout);
        for _ in 0..column {
            cursor.forward(&dom, &layout);
        }
        let start = cursor.walker().position();

        cursor.down(&dom, &layout);
        assert_eq!(layout.caret_cell(cursor.walker().position()), Some((1, column)));
        cursor.up(&dom, &layout);

        assert_eq!(cursor.walker().position(), start, "column {column}");
    }
}

#[test]
fn line_wrap_rule_recognises_wrap_geometry() {
    let (dom, container) = parse_markup("<p>hello world</p>").unwrap();
    let layout = MonospaceLayout::new(&dom, container, 8);
    let mut walker = PositionWalker::new(&dom, container);
    let rule = ZeroWidthPair::default();

    let mut wraps = Vec::new();
    while !walker.is_at_end(&dom) {
        if rule.is_line_wrap(&layout.boxes_for(&walker.caret_range(&dom))) {
            wraps.push(walker.local_offset());
        }
        walker.next_position(&dom);
    }

    assert_eq!(wraps, vec![5]);
    assert!(!rule.is_line_wrap(&[Rect::new(0.0, 5.0, 1.0, 5.0)]));
}

#[test]
fn down_visits_every_line_across_paragraphs() {
    // one
    // two
    // three
    let (dom, container) = parse_markup("<div><p>one two </p><p>three</p></div>").unwrap();
    let layout = MonospaceLayout::new(&dom, container, 6);
    let mut cursor = CursorManager::new(&dom, container, &layout);

    let mut visited = Vec::new();
    while !cursor.walker().is_at_end(&dom) {
        cursor.down(&dom, &layout);
        visited.extend(layout.caret_cell(cursor.walker().position()));
    }

    assert_eq!(visited, vec![(1, 0), (2, 0), (2, 5)]);
}
